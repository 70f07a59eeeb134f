use gang_sheet::*;

fn grouped(size: SheetSize, logos: usize, quantity: usize, index: usize) -> GroupedSheet {
    let mut sheet = Sheet::new(size);
    for i in 0..logos {
        sheet.placements.push(Placement {
            id: PlacementId::next(),
            logo: LogoRef {
                id: i.to_string(),
                description: String::new(),
                account_name: String::new(),
                raster_url: String::new(),
                vector_url: None,
            },
            note: None,
            x: 0.2,
            y: 0.2 + i as f64,
            width: 1.0,
            height: 0.5,
            rotated: false,
        });
    }
    GroupedSheet {
        sheet,
        quantity,
        index,
    }
}

#[test]
fn test_statistics_totals() {
    let groups = vec![
        grouped(SheetSize::Medium, 4, 3, 0),
        grouped(SheetSize::Small, 2, 1, 3),
        grouped(SheetSize::Medium, 1, 1, 4),
    ];
    let stats = calculate_statistics(&groups).unwrap();

    assert_eq!(stats.total_sheets, 5);
    assert_eq!(stats.distinct_layouts, 3);
    assert_eq!(stats.logos_placed, 4 * 3 + 2 + 1);
    assert!((stats.total_cost - (6.50 * 4.0 + 3.35)).abs() < 1e-9);
    assert_eq!(
        stats.sheets_by_size,
        vec![(SheetSize::Small, 1), (SheetSize::Medium, 4)]
    );
}

#[test]
fn test_statistics_no_sheets() {
    let result = calculate_statistics(&[]);
    assert!(matches!(result, Err(GangSheetError::NoSheets)));
}

#[test]
fn test_statistics_single_extra_large() {
    let stats = calculate_statistics(&[grouped(SheetSize::ExtraLarge, 1, 1, 0)]).unwrap();
    assert_eq!(stats.total_sheets, 1);
    assert_eq!(stats.total_cost, 30.0);
    assert_eq!(stats.sheets_by_size, vec![(SheetSize::ExtraLarge, 1)]);
}
