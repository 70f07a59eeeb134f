use gang_sheet::*;

fn logo(id: &str) -> LogoRef {
    LogoRef {
        id: id.to_string(),
        description: "Crest".to_string(),
        account_name: "Acme".to_string(),
        raster_url: format!("https://cdn.example.com/{id}.png"),
        vector_url: Some(format!("https://cdn.example.com/{id}.svg")),
    }
}

#[test]
fn test_default_options_are_valid() {
    let options = CalculationOptions::default();
    assert!(options.validate().is_ok());
    assert_eq!(options.packing.spacing_in, 0.15);
    assert_eq!(options.packing.margin_in, 0.2);
    assert_eq!(options.default_aspect_ratio, 2.0);
    assert_eq!(options.preferred_size, None);
}

#[test]
fn test_validation_rejects_bad_geometry() {
    let mut options = CalculationOptions::default();
    options.packing.margin_in = -0.1;
    match options.validate() {
        Err(GangSheetError::Config(msg)) => assert!(msg.contains("Margin")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    let mut options = CalculationOptions::default();
    options.packing.spacing_in = f64::NAN;
    assert!(options.validate().is_err());

    let mut options = CalculationOptions::default();
    options.default_aspect_ratio = 0.0;
    assert!(options.validate().is_err());

    let mut options = CalculationOptions::default();
    options.resolve_timeout_ms = 0;
    assert!(options.validate().is_err());

    // Zero spacing is allowed
    let mut options = CalculationOptions::default();
    options.packing.spacing_in = 0.0;
    assert!(options.validate().is_ok());
}

#[test]
fn test_order_validation() {
    assert!(Order::new(vec![]).validate().is_err());

    let order = Order::new(vec![SelectionRequest::new(logo("1"), 4.0, 2)]);
    assert!(order.validate().is_ok());

    let order = Order::new(vec![
        SelectionRequest::new(logo("1"), 4.0, 2),
        SelectionRequest::new(logo("2"), 0.0, 1),
    ]);
    match order.validate() {
        Err(GangSheetError::Config(msg)) => assert!(msg.contains("width")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    let order = Order::new(vec![SelectionRequest::new(logo("1"), 4.0, 0)]);
    assert!(order.validate().is_err());
}

#[test]
fn test_sheet_size_table() {
    assert_eq!(SheetSize::Small.dimensions_in(), (11.0, 12.5));
    assert_eq!(SheetSize::Medium.dimensions_in(), (22.5, 12.5));
    assert_eq!(SheetSize::Large.dimensions_in(), (22.5, 25.0));
    assert_eq!(SheetSize::ExtraLarge.dimensions_in(), (22.5, 60.0));
    assert_eq!(SheetSize::ExtraLarge.price(), 30.0);
    assert_eq!(SheetSize::largest(), SheetSize::ExtraLarge);
    assert_eq!(SheetSize::ExtraLarge.to_string(), "Extra Large");
}

#[test]
fn test_rotation_cycle() {
    let mut rotation = Rotation::default();
    let mut degrees = Vec::new();
    for _ in 0..4 {
        rotation = rotation.next();
        degrees.push(rotation.degrees());
    }
    assert_eq!(degrees, vec![90, 180, 270, 0]);
    assert!(Rotation::Clockwise270.swaps_dimensions());
    assert!(!Rotation::Clockwise180.swaps_dimensions());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let mut options = CalculationOptions::default().with_preferred_size(Some(SheetSize::Large));
    options.packing.spacing_in = 0.25;
    options.resolve_timeout_ms = 2500;

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    options.save(path).await.unwrap();
    let loaded = CalculationOptions::load(path).await.unwrap();

    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_order_round_trip_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.json");

    let order = Order::new(vec![
        SelectionRequest::new(logo("1"), 4.0, 2).with_note("front"),
        SelectionRequest::new(logo("2"), 2.5, 1).with_rotated(true),
    ]);
    order.save(&path).await.unwrap();
    assert_eq!(Order::load(&path).await.unwrap(), order);

    // Options and optional request fields may be left out
    let minimal = r#"{
        "requests": [{
            "logo": {
                "id": "7",
                "description": "Crest",
                "account_name": "Acme",
                "raster_url": "7.png"
            },
            "width_in": 3.0,
            "quantity": 4
        }],
        "options": { "preferred_size": "Extra Large" }
    }"#;
    tokio::fs::write(&path, minimal).await.unwrap();

    let loaded = Order::load(&path).await.unwrap();
    assert_eq!(loaded.options.preferred_size, Some(SheetSize::ExtraLarge));
    assert_eq!(loaded.options.packing, PackingOptions::default());
    assert_eq!(loaded.requests[0].note, None);
    assert!(!loaded.requests[0].rotated);
    assert!(loaded.validate().is_ok());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    match Order::load(&path).await {
        Err(GangSheetError::Config(msg)) => assert!(msg.contains("parse")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}
