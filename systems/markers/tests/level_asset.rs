use std::path::PathBuf;

use hungry_worm_core::{Cell, EntityKind};
use hungry_worm_system_markers::{LevelAsset, LevelError};

fn meadow_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../levels/meadow.toml")
}

#[test]
fn bundled_level_parses_into_layout_and_rules() {
    let asset = LevelAsset::load(meadow_path()).expect("bundled level loads");
    let layout = asset.layout().expect("bundled level is valid");
    let rules = asset.rules().expect("bundled timings are valid");

    assert_eq!(asset.name(), "meadow");
    assert_eq!(layout.walls().columns(), 12);
    assert_eq!(layout.walls().rows(), 10);
    assert_eq!(layout.markers().spawn_points().len(), 2);
    assert_eq!(layout.markers().points_for(EntityKind::Fruit).len(), 4);
    assert_eq!(layout.markers().points_for(EntityKind::Hazard).len(), 3);
    assert!(layout.markers().spawn_points().contains(&Cell::new(1, 1)));
    assert!(layout.walls().blocks(Cell::new(5, 4)));
    assert!(!layout.walls().blocks(Cell::new(11, 3)));
    assert_eq!(rules.fruit_goal(), Some(10));
}

#[test]
fn layout_errors_surface_through_the_asset() {
    let asset = LevelAsset::from_toml_str(
        r##"
            name = "walled-in"

            [layers]
            markers = ["S.F"]
            walls = ["#.."]
        "##,
    )
    .expect("valid toml");

    assert!(matches!(
        asset.layout(),
        Err(LevelError::MarkerOnWall { cell }) if cell == Cell::new(0, 0)
    ));
}
