use std::fs;
use std::sync::Arc;

use message_tag::*;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tags.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn registry_from_file() {
    let (_dir, path) = write_config(
        r#"
[tags]
paths = ["Item.Weapon.Sword", "Item.Weapon.Bow", "Skill.Combat"]

[[redirects]]
old = "Item.Sword"
new = "Item.Weapon.Sword"
"#,
    );

    let reg = MessageTagRegistry::from_file(&path).unwrap();
    assert_eq!(reg.len(), 6);
    assert_eq!(reg.all_tags(true).len(), 3);

    let sword = reg.request_tag("Item.Weapon.Sword", true);
    assert_eq!(reg.import("Item.Sword"), sword);
    assert_eq!(
        reg.request_tag_children(&reg.request_tag("Item", true)).to_string_simple(false),
        "Item.Weapon, Item.Weapon.Bow, Item.Weapon.Sword"
    );
}

#[test]
fn missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = MessageTagRegistry::from_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, TagError::Config(TagsConfigError::Io(_))));
}

#[test]
fn invalid_path_in_file_is_config_error() {
    let (_dir, path) = write_config("[tags]\npaths = [\"A..B\"]\n");
    let err = MessageTagRegistry::from_file(&path).unwrap_err();
    assert!(matches!(err, TagError::Config(TagsConfigError::Validation(_))));
}

#[test]
fn runtime_registration_extends_existing_containers() {
    let mut reg = MessageTagRegistry::build(&["Status.Burning"]).unwrap();
    let burning = reg.request_tag("Status.Burning", true);
    let container = TagContainer::from_tag(burning);

    let frozen = reg.register("Status.Frozen").unwrap();
    let status = reg.request_tag("Status", true);

    assert!(frozen.matches_tag(&status));
    assert!(container.has_tag(&status));
    assert!(!container.has_tag(&frozen));
}

#[test]
fn registries_sharing_names_agree() {
    let names = Arc::new(NameTable::new());
    let game = MessageTagRegistry::with_names(Arc::clone(&names));
    let mut tools = MessageTagRegistry::with_names(Arc::clone(&names));
    tools.register("Editor.Selected").unwrap();

    // Unknown to `game`, kept as a raw tag from the shared table
    let imported = game.import("Editor.Selected");
    assert_eq!(imported, tools.request_tag("Editor.Selected", true));
}

#[test]
fn plugin_registry_is_a_resource() {
    use ::bevy::prelude::App;
    use message_tag::bevy::{MessageTags, MessageTagsPlugin};

    let mut app = App::new();
    app.add_plugins(MessageTagsPlugin::from_paths(&["Team.Red", "Team.Blue"]));

    let reg = app.world().resource::<MessageTagRegistry>();
    let tags = MessageTags::from(reg.request_tag_container(&["Team.Red"], true));
    let team = reg.request_tag("Team", true);
    assert!(tags.has_tag(&team));
}
