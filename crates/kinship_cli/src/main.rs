//! CLI smoke entry point.
//!
//! # Responsibility
//! - Build a small sample tree against a console view and print the
//!   placements and lines of each pass.
//! - `--json` prints the final layout and connectors as JSON instead.
//! - `KINSHIP_LOG_DIR` (absolute path) enables file logging.

use kinship_core::{
    BoxPlacement, Connector, FamilyTreeService, NewPerson, PersonId, Rect, RelativeDraft,
    RelativeKind, Relationships, TreeConfig, TreeView,
};
use log::warn;

/// Prints view calls to stdout unless quiet.
struct ConsoleView {
    quiet: bool,
}

impl TreeView for ConsoleView {
    fn place_box(&mut self, placement: &BoxPlacement) {
        if self.quiet {
            return;
        }
        println!(
            "box  {:<24} gen={:<2} unit={:<16} role={:?} at=({:.0},{:.0}) delay={}ms{}",
            placement.details.name,
            placement.generation,
            placement.family_unit,
            placement.role,
            placement.rect.x,
            placement.rect.y,
            placement.delay.as_millis(),
            if placement.newly_added { " new" } else { "" }
        );
    }

    fn remove_box(&mut self, id: &PersonId) {
        if !self.quiet {
            println!("remove {id}");
        }
    }

    fn draw_line(&mut self, connector: &Connector) {
        if self.quiet {
            return;
        }
        println!(
            "line {:?} {} -> {} ({:.0},{:.0})-({:.0},{:.0})",
            connector.kind,
            connector.from,
            connector.to,
            connector.start.x,
            connector.start.y,
            connector.end.x,
            connector.end.y
        );
    }

    fn clear_lines(&mut self) {
        if !self.quiet {
            println!("-- pass --");
        }
    }

    fn center_on(&mut self, bounds: Rect) {
        if !self.quiet {
            println!(
                "center ({:.0},{:.0}) {:.0}x{:.0}",
                bounds.x, bounds.y, bounds.width, bounds.height
            );
        }
    }
}

fn main() {
    let json = std::env::args().any(|arg| arg == "--json");

    if let Ok(log_dir) = std::env::var("KINSHIP_LOG_DIR") {
        if let Err(err) = kinship_core::init_logging(kinship_core::default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("kinship_core ping={}", kinship_core::ping());
    println!("kinship_core version={}", kinship_core::core_version());

    let mut service = FamilyTreeService::new(TreeConfig::default(), ConsoleView { quiet: json });
    if let Err(err) = build_sample(&mut service) {
        warn!("event=cli_sample module=cli status=error error={err}");
        eprintln!("failed to build sample tree: {err}");
        std::process::exit(1);
    }

    let status = service.get_status();
    if json {
        let snapshot = serde_json::json!({
            "status": status,
            "layout": service.last_layout(),
            "connectors": service.connectors(),
        });
        match serde_json::to_string_pretty(&snapshot) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("failed to encode snapshot: {err}"),
        }
    } else {
        println!(
            "people={} generations={} rearranging={}",
            status.people_count, status.generations_count, status.is_rearranging
        );
    }
}

fn build_sample(
    service: &mut FamilyTreeService<ConsoleView>,
) -> Result<(), Box<dyn std::error::Error>> {
    service.mark_view_ready();
    let root = service.add_person(
        NewPerson::new("Ahmed Al Mansouri").with_id("p1"),
        0,
        "main",
        Relationships::default(),
    )?;
    service.add_relative(
        &RelativeDraft::new(RelativeKind::Spouse, root.id.clone())
            .name("Fatima Al Mansouri")
            .gender("female"),
    )?;
    for name in ["Omar", "Mariam", "Khalid"] {
        service.add_relative(
            &RelativeDraft::new(RelativeKind::Child, root.id.clone())
                .name(name)
                .birth_year("1990"),
        )?;
    }
    Ok(())
}
