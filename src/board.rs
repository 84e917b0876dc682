//! Kanban board: status partition, drag gesture and move intents
//!
//! The board never mutates tickets itself. A completed gesture produces a
//! [`MoveIntent`] which is committed through the ticket service; the board is
//! then re-partitioned from the updated list.

use tracing::{debug, info};

use crate::entity::Ticket;
use crate::error::Result;
use crate::service::TicketService;
use crate::store::DataClient;
use crate::types::{EntityId, TicketStatus};

/// The five board columns in display order
pub const COLUMNS: [TicketStatus; 5] = [
    TicketStatus::New,
    TicketStatus::InProgress,
    TicketStatus::Testing,
    TicketStatus::Resolved,
    TicketStatus::Closed,
];

/// Column headings
pub const COLUMN_TITLES: [&str; 5] = ["New", "In Progress", "Testing", "Resolved", "Closed"];

pub fn column_index(status: TicketStatus) -> usize {
    match status {
        TicketStatus::New => 0,
        TicketStatus::InProgress => 1,
        TicketStatus::Testing => 2,
        TicketStatus::Resolved => 3,
        TicketStatus::Closed => 4,
    }
}

pub fn column_title(status: TicketStatus) -> &'static str {
    COLUMN_TITLES[column_index(status)]
}

/// Tickets grouped by status, keeping list order inside each column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board<'a> {
    columns: [Vec<&'a Ticket>; 5],
}

/// Partition tickets into the five status columns in one pass
pub fn partition<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Board<'a> {
    let mut board = Board::default();
    for ticket in tickets {
        board.columns[column_index(ticket.status)].push(ticket);
    }
    board
}

impl<'a> Board<'a> {
    pub fn column(&self, status: TicketStatus) -> &[&'a Ticket] {
        &self.columns[column_index(status)]
    }

    /// Columns paired with their status, in display order
    pub fn columns(&self) -> impl Iterator<Item = (TicketStatus, &[&'a Ticket])> {
        COLUMNS
            .iter()
            .zip(self.columns.iter())
            .map(|(status, tickets)| (*status, tickets.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Current column of a card on the board
    pub fn status_of(&self, id: &EntityId) -> Option<TicketStatus> {
        self.columns()
            .find(|(_, tickets)| tickets.iter().any(|t| &t.id == id))
            .map(|(status, _)| status)
    }

    /// Ticket at a column position
    pub fn card(&self, status: TicketStatus, row: usize) -> Option<&'a Ticket> {
        self.columns[column_index(status)].get(row).copied()
    }
}

/// Request to move one ticket between columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    pub ticket_id: EntityId,
    pub from: TicketStatus,
    pub to: TicketStatus,
}

impl MoveIntent {
    /// An intent, or `None` when source and target are the same column
    pub fn new(ticket_id: EntityId, from: TicketStatus, to: TicketStatus) -> Option<Self> {
        (from != to).then_some(MoveIntent {
            ticket_id,
            from,
            to,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// What the pointer is over when released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(TicketStatus),
    /// Another card; resolves to the column that card sits in
    Card(EntityId),
    Nowhere,
}

impl DropTarget {
    fn resolve(&self, board: &Board<'_>) -> Option<TicketStatus> {
        match self {
            DropTarget::Column(status) => Some(*status),
            DropTarget::Card(id) => board.status_of(id),
            DropTarget::Nowhere => None,
        }
    }
}

/// Pointer gesture over the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        ticket_id: EntityId,
        from: TicketStatus,
        /// Row the card was picked up from
        index: usize,
        hover: DropTarget,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Pick up the card at `row` of `status`. Missing cards leave the gesture idle.
    pub fn pointer_down(&mut self, board: &Board<'_>, status: TicketStatus, row: usize) {
        *self = match board.card(status, row) {
            Some(ticket) => DragState::Dragging {
                ticket_id: ticket.id.clone(),
                from: status,
                index: row,
                hover: DropTarget::Column(status),
            },
            None => DragState::Idle,
        };
    }

    pub fn hover(&mut self, target: DropTarget) {
        if let DragState::Dragging { hover, .. } = self {
            *hover = target;
        }
    }

    /// Drop the card and return the resulting move, if any.
    ///
    /// Dropping on the source column, on a card in the source column or on
    /// empty space yields `None`. The gesture always ends.
    pub fn pointer_up(&mut self, target: DropTarget, board: &Board<'_>) -> Option<MoveIntent> {
        let DragState::Dragging { ticket_id, from, .. } = std::mem::take(self) else {
            return None;
        };
        let to = target.resolve(board)?;
        let intent = MoveIntent::new(ticket_id, from, to);
        debug!(?intent, "drop resolved");
        intent
    }

    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }
}

/// Horizontal geometry of the rendered columns, in cells or pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub origin_x: u32,
    pub column_width: u32,
    pub gap: u32,
}

impl BoardLayout {
    pub fn new(origin_x: u32, column_width: u32, gap: u32) -> Self {
        BoardLayout {
            origin_x,
            column_width,
            gap,
        }
    }

    /// Split `total_width` evenly across the five columns
    pub fn fit(total_width: u32, gap: u32) -> Self {
        let gaps = gap.saturating_mul(COLUMNS.len() as u32 - 1);
        let column_width = total_width.saturating_sub(gaps) / COLUMNS.len() as u32;
        BoardLayout::new(0, column_width.max(1), gap)
    }

    /// Column under horizontal coordinate `x`; gaps and margins are empty space
    pub fn column_at(&self, x: u32) -> Option<TicketStatus> {
        let offset = x.checked_sub(self.origin_x)?;
        let stride = self.column_width.saturating_add(self.gap);
        if stride == 0 {
            return None;
        }
        let index = (offset / stride) as usize;
        if offset % stride >= self.column_width {
            return None;
        }
        COLUMNS.get(index).copied()
    }

    pub fn drop_target(&self, x: u32) -> DropTarget {
        self.column_at(x)
            .map(DropTarget::Column)
            .unwrap_or(DropTarget::Nowhere)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Move a ticket one column left or right. Edges yield `None`.
pub fn keyboard_move(ticket: &Ticket, direction: Direction) -> Option<MoveIntent> {
    let index = column_index(ticket.status);
    let target = match direction {
        Direction::Left => index.checked_sub(1)?,
        Direction::Right => index + 1,
    };
    let to = *COLUMNS.get(target)?;
    MoveIntent::new(ticket.id.clone(), ticket.status, to)
}

/// Commit a move through the ticket service.
///
/// Issues exactly one status update, or none for a same-column intent. The
/// returned ticket is the confirmed record for the caller's list.
pub async fn commit_move<C: DataClient<Ticket>>(
    intent: &MoveIntent,
    tickets: &TicketService<C>,
) -> Result<Option<Ticket>> {
    if intent.is_noop() {
        return Ok(None);
    }
    let ticket = tickets.update_status(&intent.ticket_id, intent.to).await?;
    info!(id = %intent.ticket_id, from = %intent.from, to = %intent.to, "ticket moved");
    Ok(Some(ticket))
}
