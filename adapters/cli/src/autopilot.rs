//! Scripted input that steers each snake toward the nearest item.

use dark_snake_core::{GridCell, Heading, ItemSnapshot, PlayerSnapshot};
use dark_snake_system_session::FrameIntents;

const HEADINGS: [Heading; 4] = [Heading::Up, Heading::Down, Heading::Left, Heading::Right];

/// Builds the intents for one frame from the current snapshots.
pub(crate) fn intents(
    players: &[PlayerSnapshot],
    items: &[ItemSnapshot],
    columns: u32,
    rows: u32,
) -> FrameIntents {
    let mut intents = FrameIntents::default();
    for player in players {
        let Some(head) = player.head() else {
            continue;
        };
        let Some(target) = items
            .iter()
            .min_by_key(|item| (distance(head, item.cell, columns, rows), item.id))
        else {
            continue;
        };
        let best = HEADINGS
            .iter()
            .copied()
            .filter(|heading| *heading != player.heading.reverse())
            .filter(|heading| !player.cells.contains(&head.wrapped_step(*heading, columns, rows)))
            .min_by_key(|heading| {
                distance(head.wrapped_step(*heading, columns, rows), target.cell, columns, rows)
            });
        if let Some(heading) = best.filter(|heading| *heading != player.heading) {
            intents.steer.push((player.id, heading));
        }
    }
    intents
}

/// Manhattan distance on the wrapping field.
fn distance(from: GridCell, to: GridCell, columns: u32, rows: u32) -> u32 {
    let dx = from.column().abs_diff(to.column());
    let dy = from.row().abs_diff(to.row());
    dx.min(columns.saturating_sub(dx)) + dy.min(rows.saturating_sub(dy))
}
