//! In-memory host example demonstrating the plugin lifecycle.
//!
//! This example shows how to:
//! - Configure options with `PluginOptions::builder()`
//! - Enable the plugin against a host (here the in-memory one)
//! - Recheck players on join and on permission recalculation
//! - Run `/inputpermission` commands and drive a form flow
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example memory_host --package input_permission
//! ```

use input_permission::forms::FormValue;
use input_permission::prelude::*;
use input_permission::testing::MemoryHost;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Input Permission In-Memory Host Example ===\n");

    let data_dir = std::env::temp_dir().join("input_permission_demo");
    std::fs::create_dir_all(&data_dir)?;
    std::fs::write(data_dir.join("config.yml"), "default:\n  jump: op\n  mount: notop\n")?;

    let options = PluginOptions::builder()
        .config_path(data_dir.join("config.yml"))
        .build();
    println!("Config file: {}", options.config_path.display());

    let memory = MemoryHost::new();
    let plugin = InputPermissionPlugin::enable(memory.host(), options)?;
    let names = plugin.names().clone();

    // Two players: an operator allowed to do everything, and a regular player
    let admin = memory.connect("Admin");
    let steve = memory.connect("Steve");
    plugin.on_player_join(&admin);
    plugin.on_player_join(&steve);

    memory.permissions.set_operator(&admin, true);
    for permission in [names.query_other(), names.set_other(), names.admin()] {
        memory.permissions.grant(&admin, &permission);
    }

    let show = |player: &Player| {
        let enabled = memory.inputs.memory_session(player).enabled();
        let names: Vec<_> = enabled.iter().map(PermissionCategory::name).collect();
        println!("  {player}: {}", names.join(", "));
    };
    println!("\nEnabled categories after join:");
    show(&admin);
    show(&steve);

    // Text commands
    let sender = CommandSender::Player(admin.clone());
    for args in [
        vec!["query", "Steve", "jump"],
        vec!["set", "Steve", "camera", "disabled"],
        vec!["query", "Steve", "camera", "enabled"],
    ] {
        println!("\n> /inputpermission {}", args.join(" "));
        if let CommandOutcome::Replied(feedback) = plugin.on_command(&sender, args.as_slice()) {
            println!("  {feedback}");
        }
    }

    // Form flow: open the config editor and make sneak operator-only
    memory.forms.press(&admin, 2);
    let mut answer = vec![FormValue::None; 4];
    for category in PermissionCategory::ALL {
        let value = if category == PermissionCategory::Sneak {
            "op".to_string()
        } else {
            plugin.policy().get(category).to_string()
        };
        answer.push(FormValue::Text(value));
    }
    memory.forms.submit(&admin, answer);

    println!("\n> /inputpermission (Plugin Config)");
    if let CommandOutcome::FormOpened(flow) = plugin.on_command(&sender, &[] as &[&str]) {
        flow.await?;
    }
    for message in memory.server.messages(&admin).iter().skip(3) {
        println!("  {message}");
    }

    println!("\nEnabled categories after the config change:");
    show(&admin);
    show(&steve);

    plugin.on_player_quit(&steve);
    memory.disconnect(&steve);
    println!("\n=== Example Complete ===");
    Ok(())
}
