use tracing::warn;

use super::{LoadState, Notice, ViewSession};
use crate::board::{Board, MoveIntent, commit_move, partition};
use crate::entity::Ticket;
use crate::filter::{TicketFilters, filter_tickets};
use crate::service::TicketService;
use crate::store::DataClient;
use crate::types::EntityId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    List,
    Board,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    id: EntityId,
    session: ViewSession,
}

/// Ticket page state: the canonical ticket list plus view state around it
#[derive(Debug, Clone, Default)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub filters: TicketFilters,
    pub view: ViewMode,
    pub load: LoadState,
    pub notice: Option<Notice>,
    selected: Option<Selection>,
    create_session: Option<ViewSession>,
    last_session: Option<ViewSession>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TicketAction {
    LoadStarted,
    Loaded(Vec<Ticket>),
    LoadFailed(String),
    /// A ticket created from the create modal opened as `session`
    Created {
        ticket: Ticket,
        session: ViewSession,
    },
    Updated(Ticket),
    Deleted(EntityId),
    FilterChanged(TicketFilters),
    ClearFilters,
    SetView(ViewMode),
    Select(EntityId),
    CloseDetail,
    OpenCreate,
    CloseCreate,
    ServiceFailed(String),
    DismissNotice,
}

impl TicketPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_session(&mut self) -> ViewSession {
        let session = self
            .last_session
            .map(ViewSession::next)
            .unwrap_or_else(ViewSession::first);
        self.last_session = Some(session);
        session
    }

    /// Tickets passing the current filters, in list order
    pub fn visible_tickets(&self) -> Vec<&Ticket> {
        filter_tickets(&self.tickets, &self.filters)
    }

    /// Board partition of the visible tickets
    pub fn board(&self) -> Board<'_> {
        partition(self.visible_tickets())
    }

    pub fn selected_ticket(&self) -> Option<&Ticket> {
        let selection = self.selected.as_ref()?;
        self.tickets.iter().find(|t| t.id == selection.id)
    }

    pub fn detail_session(&self) -> Option<ViewSession> {
        self.selected.as_ref().map(|s| s.session)
    }

    pub fn create_session(&self) -> Option<ViewSession> {
        self.create_session
    }

    pub fn is_create_open(&self) -> bool {
        self.create_session.is_some()
    }
}

/// Pure function: apply action to state (reducer pattern)
///
/// Service calls happen outside; their confirmed results come back in as
/// actions. List changes always apply. Modal state only follows results
/// from the session that is still open.
pub fn reduce_ticket_page(mut state: TicketPage, action: TicketAction) -> TicketPage {
    match action {
        TicketAction::LoadStarted => {
            state.load = LoadState::Loading;
        }
        TicketAction::Loaded(tickets) => {
            state.tickets = tickets;
            state.load = LoadState::Loaded;
            if state.selected_ticket().is_none() {
                state.selected = None;
            }
        }
        TicketAction::LoadFailed(message) => {
            state.tickets.clear();
            state.selected = None;
            state.load = LoadState::Failed(message);
        }
        TicketAction::Created { ticket, session } => {
            // A reload may already have delivered it
            match state.tickets.iter_mut().find(|t| t.id == ticket.id) {
                Some(slot) if slot.version < ticket.version => *slot = ticket,
                Some(_) => {}
                None => state.tickets.insert(0, ticket),
            }
            if state.create_session == Some(session) {
                state.create_session = None;
                state.notice = Some(Notice::success("Ticket created"));
            }
        }
        TicketAction::Updated(ticket) => {
            if let Some(slot) = state.tickets.iter_mut().find(|t| t.id == ticket.id) {
                *slot = ticket;
            }
        }
        TicketAction::Deleted(id) => {
            state.tickets.retain(|t| t.id != id);
            if state.selected.as_ref().is_some_and(|s| s.id == id) {
                state.selected = None;
            }
            state.notice = Some(Notice::success("Ticket deleted"));
        }
        TicketAction::FilterChanged(filters) => {
            state.filters = filters;
        }
        TicketAction::ClearFilters => {
            state.filters = TicketFilters::default();
        }
        TicketAction::SetView(view) => {
            state.view = view;
        }
        TicketAction::Select(id) => {
            if state.tickets.iter().any(|t| t.id == id) {
                let session = state.open_session();
                state.selected = Some(Selection { id, session });
            }
        }
        TicketAction::CloseDetail => {
            state.selected = None;
        }
        TicketAction::OpenCreate => {
            if state.create_session.is_none() {
                state.create_session = Some(state.open_session());
            }
        }
        TicketAction::CloseCreate => {
            state.create_session = None;
        }
        TicketAction::ServiceFailed(message) => {
            state.notice = Some(Notice::error(message));
        }
        TicketAction::DismissNotice => {
            state.notice = None;
        }
    }
    state
}

/// Fetch the ticket list as a `Loaded` or `LoadFailed` action
pub async fn load_tickets<C: DataClient<Ticket>>(tickets: &TicketService<C>) -> TicketAction {
    match tickets.get_all().await {
        Ok(list) => TicketAction::Loaded(list),
        Err(err) => {
            warn!(error = %err, "failed to load tickets");
            TicketAction::LoadFailed(err.to_string())
        }
    }
}

/// Commit a board move. A same-column intent yields no action.
pub async fn move_ticket<C: DataClient<Ticket>>(
    intent: &MoveIntent,
    tickets: &TicketService<C>,
) -> Option<TicketAction> {
    match commit_move(intent, tickets).await {
        Ok(updated) => updated.map(TicketAction::Updated),
        Err(err) => Some(TicketAction::ServiceFailed(err.to_string())),
    }
}

pub async fn delete_ticket<C: DataClient<Ticket>>(
    id: &EntityId,
    tickets: &TicketService<C>,
) -> TicketAction {
    match tickets.delete(id).await {
        Ok(()) => TicketAction::Deleted(id.clone()),
        Err(err) => TicketAction::ServiceFailed(err.to_string()),
    }
}
