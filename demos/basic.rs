//! Basic Example - an anchored notification end to end
//!
//! This example walks one notification through its lifecycle without a
//! terminal:
//! - Loading the anchor config from TOML
//! - Auto-showing after init and settling the deferred work
//! - Scrolling the anchor toward the bottom edge (the bubble flips above)
//! - Dismissing with Escape and restoring focus
//!
//! Run with: RUST_LOG=spark_notify=trace cargo run --example basic

use spark_notify::{
    allocate_element, focus, is_focused, route_event, run_until_idle, set_rect, AnchorProps,
    ElementProps, InputEvent, KeyboardEvent, NotificationAnchor, NotificationConfig,
    OverlayManager, Rect,
};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
title = "New: saved searches"
auto_show_notification_after_init = true
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== spark-notify Basic Example ===\n");

    let config = NotificationConfig::from_toml(CONFIG)?;
    let manager = OverlayManager::new();

    let button = allocate_element(ElementProps {
        id: Some("search_button".to_string()),
        rect: Rect::new(30, 5, 8, 1),
        focusable: true,
        ..Default::default()
    });
    let dot = allocate_element(ElementProps {
        rect: Rect::new(37, 5, 1, 1),
        ..Default::default()
    });
    focus(button);

    let anchor = NotificationAnchor::new(
        manager.clone(),
        AnchorProps::new(button).with_dot(dot).with_config(config),
    );
    anchor.set_bubble_template();
    anchor.on_init();
    anchor.on_after_init();
    let ticks = run_until_idle();

    println!("After init ({ticks} ticks):");
    println!("  open: {}", manager.is_open());
    println!("  overlay rect: {:?}", manager.overlay_rect());
    println!("  placement: {:?}", manager.last_position().map(|p| p.position));
    println!("  button focused: {}", is_focused(button));

    // Scroll the anchor close to the bottom edge
    set_rect(button, Rect::new(30, 21, 8, 1));
    set_rect(dot, Rect::new(37, 21, 1, 1));
    route_event(InputEvent::Resize(80, 24));

    println!("\nAfter scrolling:");
    println!("  overlay rect: {:?}", manager.overlay_rect());
    println!("  placement: {:?}", manager.last_position().map(|p| p.position));

    route_event(InputEvent::Key(KeyboardEvent::new("Escape")));
    run_until_idle();

    println!("\nAfter Escape:");
    println!("  open: {}", manager.is_open());
    println!("  button focused: {}", is_focused(button));

    anchor.on_destroy();
    println!("\n=== Example Complete ===");
    Ok(())
}
