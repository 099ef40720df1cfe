use std::fs;

use pmoplayback::{
    BuiltinIcon, CustomActionDescriptor, DirectoryIconCatalog, Extras, IconCatalog, IconRef,
    PlaybackError, resolve_icon,
};

fn descriptor(icon: IconRef, package: Option<&str>) -> CustomActionDescriptor {
    CustomActionDescriptor {
        icon,
        owning_package: package.map(str::to_string),
        action: "shuffle".to_string(),
        extras: Extras::new(),
    }
}

fn catalog() -> (tempfile::TempDir, DirectoryIconCatalog) {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("local");
    let package = dir.path().join("packages/org.example.player");
    fs::create_dir_all(&local).unwrap();
    fs::create_dir_all(&package).unwrap();
    fs::write(local.join("heart_filled.png"), b"filled").unwrap();
    fs::write(package.join("17.png"), b"shuffle").unwrap();
    let catalog = DirectoryIconCatalog::new(dir.path());
    (dir, catalog)
}

#[test]
fn test_local_icon_resolution() {
    let (_dir, catalog) = catalog();
    let filled = descriptor(IconRef::Builtin(BuiltinIcon::HeartFilled), None);
    let icon = resolve_icon(&catalog, &filled).unwrap();
    assert_eq!(icon.data, b"filled");

    let empty = descriptor(IconRef::Builtin(BuiltinIcon::HeartEmpty), None);
    assert!(resolve_icon(&catalog, &empty).is_none());
}

#[test]
fn test_package_icon_resolution() {
    let (_dir, catalog) = catalog();
    let shuffle = descriptor(IconRef::Resource(17), Some("org.example.player"));
    let icon = resolve_icon(&catalog, &shuffle).unwrap();
    assert_eq!(icon.data, b"shuffle");
    assert!(icon.path.ends_with("packages/org.example.player/17.png"));
}

#[test]
fn test_unknown_package_degrades_to_no_icon() {
    let (_dir, catalog) = catalog();
    let icon = IconRef::Resource(17);
    let unknown = catalog.package_icon("org.example.missing", &icon);
    assert!(matches!(unknown, Err(PlaybackError::UnknownPackage(_))));
    let escaping = catalog.package_icon("../local", &icon);
    assert!(matches!(escaping, Err(PlaybackError::UnknownPackage(_))));

    let missing = descriptor(icon, Some("org.example.missing"));
    assert!(resolve_icon(&catalog, &missing).is_none());
}
