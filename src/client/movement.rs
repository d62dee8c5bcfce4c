//! The movement ticket: a single-slot permit for outstanding walk and
//! teleport requests.
//!
//! The ticket is acquired before the request is put on the wire and released
//! by a confirming packet for the self object (teleport, walk terminator,
//! death) or by timeout. The server may answer a walk with a teleport, or
//! reject it silently; the timeout covers the silent case.

use std::time::Duration;

use tokio::time::Instant;

/// How long an unanswered movement request holds the ticket.
pub const MOVEMENT_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Default)]
pub struct MovementTicket {
    held_since: Option<Instant>,
}

impl MovementTicket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the ticket. Fails while a request is already outstanding.
    pub fn try_acquire(&mut self) -> bool {
        if self.held_since.is_some() {
            return false;
        }
        self.held_since = Some(Instant::now());
        true
    }

    /// Release the ticket. Returns whether it was held.
    pub fn release(&mut self) -> bool {
        self.held_since.take().is_some()
    }

    pub fn is_held(&self) -> bool {
        self.held_since.is_some()
    }

    /// Timeout instant of the outstanding request, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.held_since.map(|held| held + MOVEMENT_TIMEOUT)
    }
}

/// Straight-line step sequence from one cell toward another, in logical
/// directions (0 north, clockwise through 7 north-west). This is deliberate
/// dead reckoning, not path-finding: obstacles are the server's problem, and
/// the request encoding caps the length anyway.
pub fn direct_path(from: (u8, u8), to: (u8, u8), max_steps: usize) -> Vec<u8> {
    let (mut x, mut y) = (from.0 as i16, from.1 as i16);
    let (tx, ty) = (to.0 as i16, to.1 as i16);
    let mut steps = Vec::new();

    while (x, y) != (tx, ty) && steps.len() < max_steps {
        let dx = (tx - x).signum();
        let dy = (ty - y).signum();
        let direction = match (dx, dy) {
            (0, -1) => 0,
            (1, -1) => 1,
            (1, 0) => 2,
            (1, 1) => 3,
            (0, 1) => 4,
            (-1, 1) => 5,
            (-1, 0) => 6,
            (-1, -1) => 7,
            _ => break,
        };
        steps.push(direction);
        x += dx;
        y += dy;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_is_single_slot() {
        let mut ticket = MovementTicket::new();
        assert!(ticket.try_acquire());
        assert!(!ticket.try_acquire());
        assert!(ticket.release());
        assert!(!ticket.release());
        assert!(ticket.try_acquire());
    }

    #[test]
    fn deadline_tracks_acquisition() {
        let mut ticket = MovementTicket::new();
        assert!(ticket.deadline().is_none());
        ticket.try_acquire();
        assert!(ticket.deadline().is_some());
    }

    #[test]
    fn path_walks_diagonally_then_straight() {
        let path = direct_path((10, 10), (13, 11), 15);
        assert_eq!(path, vec![3, 2, 2]);
    }

    #[test]
    fn path_toward_origin_uses_reverse_directions() {
        let path = direct_path((5, 5), (4, 3), 15);
        assert_eq!(path, vec![7, 0]);
    }

    #[test]
    fn path_is_capped() {
        let path = direct_path((0, 0), (200, 0), 15);
        assert_eq!(path.len(), 15);
        assert!(path.iter().all(|&d| d == 2));
    }

    #[test]
    fn path_to_self_is_empty() {
        assert!(direct_path((7, 7), (7, 7), 15).is_empty());
    }
}
