use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::str::FromStr;

use crate::board::Direction;
use crate::commands::{
    MoveTarget, TestCaseCreateOptions, TestCaseListOptions, TestCaseUpdateOptions,
    TicketCreateOptions, TicketUpdateOptions, cmd_board, cmd_comment_add, cmd_comment_ls,
    cmd_move, cmd_test_case_create, cmd_test_case_delete, cmd_test_case_execute,
    cmd_test_case_ls, cmd_test_case_show, cmd_test_case_update, cmd_theme_set, cmd_theme_show,
    cmd_theme_toggle, cmd_ticket_assign, cmd_ticket_create, cmd_ticket_delete, cmd_ticket_ls,
    cmd_ticket_show, cmd_ticket_status, cmd_ticket_unassign, cmd_ticket_update, cmd_user_create,
    cmd_user_ls,
};
use crate::entity::test_case::DEFAULT_ESTIMATED_TIME;
use crate::filter::{ALL, TestCaseFilters, TicketFilters, parse_choice};
use crate::preferences::Theme;
use crate::types::{
    ExecutionResult, TestCasePriority, TestCaseStatus, TestType, TicketPriority, TicketStatus,
    VALID_EXECUTION_RESULTS, VALID_TEST_CASE_PRIORITIES, VALID_TEST_CASE_STATUSES,
    VALID_TICKET_PRIORITIES, VALID_TICKET_STATUSES,
};

#[derive(Parser)]
#[command(name = "bughive")]
#[command(about = "Bug ticket and test case tracking")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared output flag
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage bug tickets
    #[command(visible_alias = "t")]
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },

    /// Show the kanban board
    Board {
        #[command(flatten)]
        filters: TicketFilterArgs,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Move a ticket to another board column
    #[command(visible_alias = "mv")]
    Move {
        /// Ticket ID
        id: String,

        /// Target status (new, in-progress, testing, resolved, closed)
        #[arg(value_parser = parse_ticket_status, required_unless_present_any = ["left", "right"])]
        status: Option<TicketStatus>,

        /// Move one column to the left
        #[arg(long, conflicts_with_all = ["status", "right"])]
        left: bool,

        /// Move one column to the right
        #[arg(long, conflicts_with = "status")]
        right: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Manage test cases
    #[command(name = "testcase", visible_alias = "tc")]
    TestCase {
        #[command(subcommand)]
        action: TestCaseAction,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage ticket comments
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Show or change the UI theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

/// A choice filter from the command line. `All` means no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice<T>(pub Option<T>);

impl<T> Choice<T> {
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TicketFilterArgs {
    /// Only tickets with this priority ("All" for any)
    #[arg(long, value_parser = parse_ticket_priority_filter)]
    pub priority: Option<Choice<TicketPriority>>,

    /// Only tickets with this status ("All" for any)
    #[arg(long, value_parser = parse_ticket_status_filter)]
    pub status: Option<Choice<TicketStatus>>,

    /// Assignee name contains this text
    #[arg(long)]
    pub assignee: Option<String>,

    /// Title or description contains this text
    #[arg(short, long)]
    pub search: Option<String>,
}

impl From<TicketFilterArgs> for TicketFilters {
    fn from(args: TicketFilterArgs) -> Self {
        TicketFilters {
            priority: args.priority.and_then(Choice::into_inner),
            status: args.status.and_then(Choice::into_inner),
            assignee: args.assignee.unwrap_or_default(),
            search: args.search.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
pub enum TicketAction {
    /// List tickets
    #[command(visible_alias = "list")]
    Ls {
        #[command(flatten)]
        filters: TicketFilterArgs,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show a ticket with its comments
    Show {
        /// Ticket ID
        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Create a ticket
    Create {
        /// Ticket title
        title: String,

        /// What is wrong
        #[arg(short, long)]
        description: String,

        /// Priority (critical, high, medium, low)
        #[arg(short, long, default_value = "medium", value_parser = parse_ticket_priority)]
        priority: TicketPriority,

        /// Assignee user ID
        #[arg(short, long)]
        assignee: Option<String>,

        /// Steps to reproduce
        #[arg(long)]
        steps: String,

        /// Expected behavior
        #[arg(long)]
        expected: String,

        /// Actual behavior
        #[arg(long)]
        actual: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Update ticket fields
    Update {
        /// Ticket ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, value_parser = parse_ticket_priority)]
        priority: Option<TicketPriority>,

        #[arg(short, long, value_parser = parse_ticket_status)]
        status: Option<TicketStatus>,

        /// Assignee user ID
        #[arg(short, long, conflicts_with = "unassign")]
        assignee: Option<String>,

        /// Remove the assignee
        #[arg(long)]
        unassign: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Set ticket status
    Status {
        /// Ticket ID
        id: String,

        /// New status (new, in-progress, testing, resolved, closed)
        #[arg(value_parser = parse_ticket_status)]
        status: TicketStatus,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Assign a ticket to a user
    Assign {
        /// Ticket ID
        id: String,

        /// User ID
        user_id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Remove a ticket's assignee
    Unassign {
        /// Ticket ID
        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Delete a ticket
    #[command(visible_alias = "rm")]
    Delete {
        /// Ticket ID
        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Subcommand)]
pub enum TestCaseAction {
    /// List test cases with a status summary
    #[command(visible_alias = "list")]
    Ls {
        /// Title, description, category or tag contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only this status ("All" for any)
        #[arg(long, value_parser = parse_test_case_status_filter)]
        status: Option<Choice<TestCaseStatus>>,

        /// Only this priority ("All" for any)
        #[arg(long, value_parser = parse_test_case_priority_filter)]
        priority: Option<Choice<TestCasePriority>>,

        /// Only this category ("All" for any)
        #[arg(long)]
        category: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show a test case with its execution history
    Show {
        /// Test case ID
        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Create a test case
    Create {
        /// Test case title
        title: String,

        #[arg(short, long)]
        description: String,

        /// Expected result
        #[arg(long)]
        expected: String,

        /// Who runs the test
        #[arg(long)]
        assigned_to: String,

        /// Test step; repeat for each step in order
        #[arg(long = "step")]
        steps: Vec<String>,

        #[arg(short, long, default_value = "")]
        category: String,

        /// Priority (Critical, High, Medium, Low)
        #[arg(short, long, default_value = "Medium", value_parser = parse_test_case_priority)]
        priority: TestCasePriority,

        /// Test type (Functional, UI Testing, Performance Testing, ...)
        #[arg(short = 't', long = "type", default_value = "Functional", value_parser = parse_test_type)]
        test_type: TestType,

        #[arg(long, default_value = "")]
        preconditions: String,

        /// Estimated time in minutes
        #[arg(short, long, default_value_t = DEFAULT_ESTIMATED_TIME)]
        estimate: u32,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Record an execution result
    #[command(visible_alias = "run")]
    Execute {
        /// Test case ID
        id: String,

        /// Result (Pass, Fail, Blocked)
        #[arg(value_parser = parse_execution_result)]
        result: ExecutionResult,

        /// Notes about this run
        #[arg(short, long)]
        notes: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Update test case fields
    Update {
        /// Test case ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long, value_parser = parse_test_case_priority)]
        priority: Option<TestCasePriority>,

        #[arg(short = 't', long = "type", value_parser = parse_test_type)]
        test_type: Option<TestType>,

        #[arg(long)]
        preconditions: Option<String>,

        /// Replace all steps; repeat for each step in order
        #[arg(long = "step")]
        steps: Option<Vec<String>>,

        #[arg(long)]
        expected: Option<String>,

        #[arg(long)]
        assigned_to: Option<String>,

        #[arg(short, long)]
        estimate: Option<u32>,

        /// Replace tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Delete a test case
    #[command(visible_alias = "rm")]
    Delete {
        /// Test case ID
        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users
    #[command(visible_alias = "list")]
    Ls {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Create a user
    Create {
        /// Display name
        name: String,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        role: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// List comments on a ticket
    #[command(visible_alias = "list")]
    Ls {
        /// Ticket ID
        ticket_id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Comment on a ticket
    Add {
        /// Ticket ID
        ticket_id: String,

        /// Comment text
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,

        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the effective theme
    Show,
    /// Switch between dark and light
    Toggle,
    /// Store a theme (dark, light)
    Set {
        #[arg(value_parser = parse_theme)]
        theme: Theme,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> crate::error::Result<()> {
        match self {
            Commands::Ticket { action } => match action {
                TicketAction::Ls { filters, output } => {
                    cmd_ticket_ls(filters.into(), output.json).await
                }
                TicketAction::Show { id, output } => cmd_ticket_show(&id, output.json).await,
                TicketAction::Create {
                    title,
                    description,
                    priority,
                    assignee,
                    steps,
                    expected,
                    actual,
                    output,
                } => {
                    let options = TicketCreateOptions {
                        title,
                        description,
                        priority,
                        assignee,
                        steps_to_reproduce: steps,
                        expected_behavior: expected,
                        actual_behavior: actual,
                    };
                    cmd_ticket_create(options, output.json).await
                }
                TicketAction::Update {
                    id,
                    title,
                    description,
                    priority,
                    status,
                    assignee,
                    unassign,
                    output,
                } => {
                    let options = TicketUpdateOptions {
                        title,
                        description,
                        priority,
                        status,
                        assignee,
                        unassign,
                    };
                    cmd_ticket_update(&id, options, output.json).await
                }
                TicketAction::Status { id, status, output } => {
                    cmd_ticket_status(&id, status, output.json).await
                }
                TicketAction::Assign {
                    id,
                    user_id,
                    output,
                } => cmd_ticket_assign(&id, &user_id, output.json).await,
                TicketAction::Unassign { id, output } => {
                    cmd_ticket_unassign(&id, output.json).await
                }
                TicketAction::Delete { id, output } => cmd_ticket_delete(&id, output.json).await,
            },

            Commands::Board { filters, output } => cmd_board(filters.into(), output.json).await,

            Commands::Move {
                id,
                status,
                left,
                right,
                output,
            } => {
                let target = match (status, left, right) {
                    (Some(status), _, _) => MoveTarget::Status(status),
                    (None, true, _) => MoveTarget::Step(Direction::Left),
                    (None, _, true) => MoveTarget::Step(Direction::Right),
                    (None, false, false) => {
                        return Err(crate::error::BugHiveError::Config(
                            "a target status, --left or --right is required".to_string(),
                        ));
                    }
                };
                cmd_move(&id, target, output.json).await
            }

            Commands::TestCase { action } => match action {
                TestCaseAction::Ls {
                    search,
                    status,
                    priority,
                    category,
                    output,
                } => {
                    let options = TestCaseListOptions {
                        filters: TestCaseFilters {
                            search: search.unwrap_or_default(),
                            status: status.and_then(Choice::into_inner),
                            priority: priority.and_then(Choice::into_inner),
                            category: None,
                        },
                        category,
                    };
                    cmd_test_case_ls(options, output.json).await
                }
                TestCaseAction::Show { id, output } => cmd_test_case_show(&id, output.json).await,
                TestCaseAction::Create {
                    title,
                    description,
                    expected,
                    assigned_to,
                    steps,
                    category,
                    priority,
                    test_type,
                    preconditions,
                    estimate,
                    tags,
                    output,
                } => {
                    let options = TestCaseCreateOptions {
                        title,
                        description,
                        category,
                        priority,
                        test_type,
                        preconditions,
                        steps,
                        expected_result: expected,
                        assigned_to,
                        estimated_time: estimate,
                        tags,
                    };
                    cmd_test_case_create(options, output.json).await
                }
                TestCaseAction::Execute {
                    id,
                    result,
                    notes,
                    output,
                } => cmd_test_case_execute(&id, result, notes, output.json).await,
                TestCaseAction::Update {
                    id,
                    title,
                    description,
                    category,
                    priority,
                    test_type,
                    preconditions,
                    steps,
                    expected,
                    assigned_to,
                    estimate,
                    tags,
                    output,
                } => {
                    let options = TestCaseUpdateOptions {
                        title,
                        description,
                        category,
                        priority,
                        test_type,
                        preconditions,
                        steps,
                        expected_result: expected,
                        assigned_to,
                        estimated_time: estimate,
                        tags,
                    };
                    cmd_test_case_update(&id, options, output.json).await
                }
                TestCaseAction::Delete { id, output } => {
                    cmd_test_case_delete(&id, output.json).await
                }
            },

            Commands::User { action } => match action {
                UserAction::Ls { output } => cmd_user_ls(output.json).await,
                UserAction::Create {
                    name,
                    email,
                    role,
                    output,
                } => cmd_user_create(&name, email, role, output.json).await,
            },

            Commands::Comment { action } => match action {
                CommentAction::Ls { ticket_id, output } => {
                    cmd_comment_ls(&ticket_id, output.json).await
                }
                CommentAction::Add {
                    ticket_id,
                    text,
                    output,
                } => cmd_comment_add(&ticket_id, &text.join(" "), output.json).await,
            },

            Commands::Theme { action, output } => match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => cmd_theme_show(output.json),
                ThemeAction::Toggle => cmd_theme_toggle(output.json),
                ThemeAction::Set { theme } => cmd_theme_set(theme, output.json),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Generic validation helper for parsing values with a standard error message format.
fn parse_with_validation<T: FromStr>(
    s: &str,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

/// Like [`parse_with_validation`], but "All" (any case) means no filter
fn parse_filter<T: FromStr<Err = crate::error::BugHiveError>>(
    s: &str,
    field_name: &str,
    valid_values: &[&str],
) -> Result<Choice<T>, String> {
    parse_choice(s).map(Choice).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}, {}",
            field_name,
            ALL,
            valid_values.join(", ")
        )
    })
}

fn parse_ticket_priority(s: &str) -> Result<TicketPriority, String> {
    parse_with_validation(s, "priority", VALID_TICKET_PRIORITIES)
}

fn parse_ticket_status(s: &str) -> Result<TicketStatus, String> {
    parse_with_validation(s, "status", VALID_TICKET_STATUSES)
}

fn parse_ticket_priority_filter(s: &str) -> Result<Choice<TicketPriority>, String> {
    parse_filter(s, "priority", VALID_TICKET_PRIORITIES)
}

fn parse_ticket_status_filter(s: &str) -> Result<Choice<TicketStatus>, String> {
    parse_filter(s, "status", VALID_TICKET_STATUSES)
}

fn parse_test_case_priority(s: &str) -> Result<TestCasePriority, String> {
    parse_with_validation(s, "priority", VALID_TEST_CASE_PRIORITIES)
}

fn parse_test_case_priority_filter(s: &str) -> Result<Choice<TestCasePriority>, String> {
    parse_filter(s, "priority", VALID_TEST_CASE_PRIORITIES)
}

fn parse_test_case_status_filter(s: &str) -> Result<Choice<TestCaseStatus>, String> {
    parse_filter(s, "status", VALID_TEST_CASE_STATUSES)
}

fn parse_test_type(s: &str) -> Result<TestType, String> {
    let valid: Vec<&str> = TestType::ALL.iter().map(TestType::as_str).collect();
    parse_with_validation(s, "test type", &valid)
}

fn parse_execution_result(s: &str) -> Result<ExecutionResult, String> {
    parse_with_validation(s, "result", VALID_EXECUTION_RESULTS)
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    parse_with_validation(s, "theme", &["dark", "light"])
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "bughive", &mut io::stdout());
}
