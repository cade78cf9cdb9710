//! # Register Shell
//!
//! Line-oriented front end. Each input line is parsed with clap and
//! dispatched to a command; the result (or the error's message) is printed
//! and the shell waits for the next line.
//!
//! ```text
//! courtside [expense]> new
//! + Ticket #1
//! courtside [expense]> select 1 Coke
//! courtside [expense]> add 1
//! courtside [expense]> close 1
//! courtside [expense]> amount cash 5.00
//! courtside [expense]> tender cash on
//! courtside [expense]> confirm
//! ✓ Ticket #1 settled: R$ 5.00 by cash
//! ```
//!
//! Ticket, item and team positions are 1-based as printed.

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use courtside_core::{Money, Tender, TicketKind};

use crate::commands::catalog::{self, CatalogView};
use crate::commands::settlement::{self, ConfirmReceipt, PaymentReport, SettlementView};
use crate::commands::ticket::{self, BoardView, CloseResponse, LedgerReport};
use crate::commands::roster;
use crate::error::ApiError;
use crate::state::{
    BoardState, ConfigState, RemoteState, RosterState, SettlementState, StoreState,
};

/// One parsed input line.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum ShellCommand {
    /// Switch to the expense or walk-in board and load its catalog
    Board { kind: TicketKind },
    /// Open a new ticket
    New,
    /// Remove a ticket
    Rm { ticket: usize },
    /// Set the customer name
    Name {
        ticket: usize,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Set the ticket number
    Number { ticket: usize, number: String },
    /// Pick a catalog item by exact name
    Select {
        ticket: usize,
        #[arg(required = true, trailing_var_arg = true)]
        item: Vec<String>,
    },
    /// Add the picked item to the ticket
    Add { ticket: usize },
    /// Remove an item from a ticket
    Drop { ticket: usize, item: usize },
    /// Close (settle) an open ticket, or reopen a closed one
    Close { ticket: usize },
    /// Apply a discount label, or `none`
    Discount {
        #[arg(required = true, trailing_var_arg = true)]
        label: Vec<String>,
    },
    /// Enter the amount paid with a tender
    Amount {
        tender: Tender,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Tick or untick a tender
    Tender { tender: Tender, state: Switch },
    /// Confirm the open settlement
    Confirm,
    /// Cancel the open settlement
    Cancel,
    /// Show the board and any open settlement
    Show,
    /// List catalog items and discounts
    Catalog,
    /// Show pending and sold quantities
    Ledger,
    /// List payment records and totals
    Payments,
    /// Set the game date (YYYY-MM-DD) and time (HH:MM)
    Schedule { date: String, time: String },
    /// Load pre-scheduled teams
    Teams,
    /// Show a team's players
    Team { team: usize },
    /// Close the team detail
    Hide,
    /// Fetch the catalog and discounts again
    Reload,
    /// Leave the register
    Quit,
}

/// Whether the shell keeps reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Every state holder the commands draw from.
#[derive(Clone)]
pub struct Shell {
    pub boards: BoardState,
    pub settlement: SettlementState,
    pub roster: RosterState,
    pub store: StoreState,
    pub remote: RemoteState,
    pub config: ConfigState,
}

impl Shell {
    /// Reads lines until `quit` or end of input.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(self.prompt().as_bytes()).await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line).await {
                Flow::Quit => break,
                Flow::Continue(text) => {
                    if !text.is_empty() {
                        output.write_all(text.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                    }
                }
            }
            output.write_all(self.prompt().as_bytes()).await?;
            output.flush().await?;
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let kind = self.boards.with_boards(|b| b.active());
        let label = match kind {
            TicketKind::Expense => "expense",
            TicketKind::WalkIn => "walk-in",
        };
        format!("{} [{}]> ", self.config.venue.name.to_lowercase(), label)
    }

    /// Parses and runs one line. Errors become `✗ message`.
    pub async fn handle_line(&self, line: &str) -> Flow {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Flow::Continue(String::new());
        }

        let parsed = match ShellLine::try_parse_from(tokens) {
            Ok(parsed) => parsed,
            Err(e) => return Flow::Continue(e.to_string().trim_end().to_string()),
        };
        debug!(command = ?parsed.command, "Shell command");

        match self.execute(parsed.command).await {
            Ok(flow) => flow,
            Err(e) => Flow::Continue(format!("✗ {}", e.message)),
        }
    }

    /// Runs one command.
    pub async fn execute(&self, command: ShellCommand) -> Result<Flow, ApiError> {
        let text = match command {
            ShellCommand::Board { kind } => {
                let view = ticket::switch_board(&self.boards, kind);
                let mut text = self.render_board(&view);
                if let Err(e) = catalog::refresh_catalog(&self.boards, &self.remote).await {
                    text.push_str(&format!("\n✗ {}", e.message));
                }
                text
            }
            ShellCommand::New => {
                let view = ticket::add_ticket(&self.boards);
                format!("+ Ticket #{}", view.number)
            }
            ShellCommand::Rm { ticket: t } => {
                let view = ticket::remove_ticket(&self.boards, position(t)?)?;
                format!("- Ticket #{} removed", view.number)
            }
            ShellCommand::Name { ticket: t, text } => {
                ticket::rename_ticket(&self.boards, position(t)?, text.join(" "))?;
                String::new()
            }
            ShellCommand::Number { ticket: t, number } => {
                ticket::set_ticket_number(&self.boards, position(t)?, number)?;
                String::new()
            }
            ShellCommand::Select { ticket: t, item } => {
                let name = item.join(" ");
                match ticket::select_item(&self.boards, position(t)?, &name)? {
                    Some(item) => format!("  {} {}", item.name, self.money(item.price)),
                    None => format!("✗ No catalog item named \"{name}\""),
                }
            }
            ShellCommand::Add { ticket: t } => {
                match ticket::add_item(&self.boards, &self.store, position(t)?).await? {
                    Some(item) => format!("+ {} {}", item.name, self.money(item.price)),
                    None => "✗ Select an item first".to_string(),
                }
            }
            ShellCommand::Drop { ticket: t, item } => {
                let removed =
                    ticket::remove_item(&self.boards, &self.store, position(t)?, position(item)?)
                        .await?;
                format!("- {} {}", removed.name, self.money(removed.price))
            }
            ShellCommand::Close { ticket: t } => {
                match ticket::toggle_close(&self.boards, &self.settlement, position(t)?)? {
                    CloseResponse::Reopened { number, discarded } => {
                        format!("Ticket #{number} reopened ({discarded} items discarded)")
                    }
                    CloseResponse::Settling(view) => self.render_settlement(&view),
                }
            }
            ShellCommand::Discount { label } => {
                let label = label.join(" ");
                let label = (!label.eq_ignore_ascii_case("none")).then_some(label.as_str());
                let view = settlement::select_discount(&self.boards, &self.settlement, label)?;
                self.render_settlement(&view)
            }
            ShellCommand::Amount { tender, value } => {
                let view = settlement::set_tender_amount(&self.settlement, tender, &value)?;
                self.render_settlement(&view)
            }
            ShellCommand::Tender { tender, state } => {
                let view =
                    settlement::toggle_tender(&self.settlement, tender, state == Switch::On)?;
                self.render_settlement(&view)
            }
            ShellCommand::Confirm => {
                let receipt = settlement::confirm_settlement(
                    &self.boards,
                    &self.settlement,
                    &self.store,
                    &self.remote,
                    &self.config,
                )
                .await?;
                self.render_receipt(&receipt)
            }
            ShellCommand::Cancel => {
                let view = settlement::cancel_settlement(&self.settlement)?;
                format!("Settlement for ticket #{} cancelled", view.ticket_number)
            }
            ShellCommand::Show => {
                let mut text = self.render_board(&ticket::get_board(&self.boards));
                if let Some(view) = settlement::get_settlement(&self.settlement) {
                    text.push('\n');
                    text.push_str(&self.render_settlement(&view));
                }
                text
            }
            ShellCommand::Catalog => self.render_catalog(&catalog::get_catalog(&self.boards)),
            ShellCommand::Ledger => {
                self.render_ledgers(&ticket::get_ledgers(&self.boards, &self.store).await?)
            }
            ShellCommand::Payments => {
                self.render_payments(&settlement::list_payments(&self.store).await?)
            }
            ShellCommand::Schedule { date, time } => {
                let slot = settlement::set_schedule(&self.store, &date, &time).await?;
                format!("Game slot: {}", slot.date_time())
            }
            ShellCommand::Teams => {
                let teams = roster::list_teams(&self.remote, &self.roster).await?;
                render_teams(&teams)
            }
            ShellCommand::Team { team } => {
                let detail = roster::show_team(&self.remote, &self.roster, position(team)?).await?;
                render_team_detail(&detail)
            }
            ShellCommand::Hide => {
                roster::hide_team(&self.roster);
                render_teams(&roster::get_teams(&self.roster))
            }
            ShellCommand::Reload => {
                let refresh = catalog::refresh_catalog(&self.boards, &self.remote).await?;
                format!("{} items, {} discounts", refresh.items, refresh.discounts)
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Continue(text))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn money(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!(
            "{}{} {}.{:02}",
            sign,
            self.config.venue.currency_symbol,
            amount.reais().abs(),
            amount.cents_part()
        )
    }

    fn render_board(&self, view: &BoardView) -> String {
        let mut out = format!("== {} ==", view.kind);
        if view.tickets.is_empty() {
            out.push_str("\n(no tickets)");
        }
        for (pos, t) in view.tickets.iter().enumerate() {
            let state = if t.is_closed { " [closed]" } else { "" };
            let name = if t.customer_name.is_empty() {
                "-"
            } else {
                t.customer_name.as_str()
            };
            out.push_str(&format!(
                "\n{}. #{} {}{}  total {}",
                pos + 1,
                t.number,
                name,
                state,
                self.money(t.total)
            ));
            for (i, item) in t.items.iter().enumerate() {
                out.push_str(&format!("\n     {}) {} {}", i + 1, item.name, self.money(item.price)));
            }
            if let Some(selected) = &t.selected {
                out.push_str(&format!("\n     picked: {selected}"));
            }
        }
        out
    }

    fn render_settlement(&self, view: &SettlementView) -> String {
        let mut out = format!(
            "-- Closing ticket #{} ({}) --\nTotal {}",
            view.ticket_number,
            view.kind,
            self.money(view.base_total)
        );
        if let Some(label) = &view.discount {
            out.push_str(&format!("\nDiscount {label}: {}", self.money(view.final_total)));
        }
        for (tender, line) in &view.tenders {
            let mark = if line.selected { "x" } else { " " };
            out.push_str(&format!("\n[{mark}] {:<6} {}", tender.to_string(), self.money(line.amount)));
        }
        out.push_str(&format!(
            "\nEntered {} of {}",
            self.money(view.selected_sum),
            self.money(view.final_total)
        ));
        out
    }

    fn render_receipt(&self, receipt: &ConfirmReceipt) -> String {
        let mut out = format!(
            "✓ Ticket #{} settled: {} by {}",
            receipt.ticket_number,
            self.money(receipt.total),
            receipt.tender
        );
        for record in &receipt.records {
            out.push_str(&format!("\n  {} {}", record.tender, self.money(record.amount)));
        }
        if let Some(total) = receipt.loose_sale_total {
            out.push_str(&format!("\nWalk-in sales so far: {}", self.money(total)));
        }
        out
    }

    fn render_catalog(&self, view: &CatalogView) -> String {
        let mut out = String::from("Catalog:");
        if view.items.is_empty() {
            out.push_str("\n  (empty)");
        }
        for item in &view.items {
            out.push_str(&format!(
                "\n  {} {} ({} in stock)",
                item.name,
                self.money(item.price),
                item.available_quantity
            ));
        }
        out.push_str("\nDiscounts:");
        for (label, rate) in &view.discounts {
            out.push_str(&format!("\n  {label}: {}%", rate.percentage()));
        }
        out
    }

    fn render_ledgers(&self, report: &LedgerReport) -> String {
        let mut out = format!("Pending on {} tickets:", report.kind);
        for (name, qty) in report.pending.iter() {
            out.push_str(&format!("\n  {name}: {qty}"));
        }
        out.push_str("\nSold as walk-in:");
        for (name, qty) in report.sold.iter() {
            out.push_str(&format!("\n  {name}: {qty}"));
        }
        out
    }

    fn render_payments(&self, report: &PaymentReport) -> String {
        let mut out = format!("{} payment records", report.records.len());
        for (tender, total) in &report.summary.totals {
            out.push_str(&format!("\n  {:<6} {}", tender.to_string(), self.money(*total)));
        }
        out.push_str(&format!(
            "\n  total  {}\nWalk-in sales: {}",
            self.money(report.summary.grand_total()),
            self.money(report.loose_sale_total)
        ));
        out
    }
}

fn render_teams(teams: &[courtside_core::TeamSummary]) -> String {
    if teams.is_empty() {
        return "(no pre-scheduled teams)".to_string();
    }
    teams
        .iter()
        .enumerate()
        .map(|(pos, t)| {
            format!(
                "{}. {}  {}  {}",
                pos + 1,
                t.team_name,
                t.player_name,
                t.dial_uri().unwrap_or_else(|| t.contact.clone())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_team_detail(detail: &courtside_core::TeamDetail) -> String {
    let mut out = format!("== {} ==", detail.team.team_name);
    if detail.players.is_empty() {
        out.push_str("\n(no players)");
    }
    for player in &detail.players {
        out.push_str(&format!(
            "\n  {}  {}",
            player.display_name(),
            player.display_contact()
        ));
    }
    out
}

/// Converts a printed 1-based position to an index.
fn position(printed: usize) -> Result<usize, ApiError> {
    printed
        .checked_sub(1)
        .ok_or_else(|| ApiError::validation("Positions start at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{catalog_item, roster_team, Harness};

    fn shell(h: &Harness) -> Shell {
        Shell {
            boards: h.boards.clone(),
            settlement: h.settlement.clone(),
            roster: h.roster.clone(),
            store: h.store.clone(),
            remote: h.remote.clone(),
            config: h.config.clone(),
        }
    }

    fn parse(line: &str) -> ShellCommand {
        ShellLine::try_parse_from(line.split_whitespace())
            .unwrap()
            .command
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(parse("board walk-in"), ShellCommand::Board { kind: TicketKind::WalkIn });
        assert_eq!(
            parse("select 2 Agua com gas"),
            ShellCommand::Select {
                ticket: 2,
                item: vec!["Agua".into(), "com".into(), "gas".into()]
            }
        );
        assert_eq!(
            parse("amount pix -3"),
            ShellCommand::Amount {
                tender: Tender::InstantTransfer,
                value: "-3".into()
            }
        );
        assert_eq!(
            parse("tender credito on"),
            ShellCommand::Tender {
                tender: Tender::Credit,
                state: Switch::On
            }
        );
        assert!(ShellLine::try_parse_from(["amount", "voucher", "1"]).is_err());
        assert!(ShellLine::try_parse_from(["select", "1"]).is_err());
    }

    #[tokio::test]
    async fn test_scripted_sale() {
        let h = Harness::new();
        h.backend
            .set_catalog(vec![catalog_item("Coke", 500), catalog_item("Chips", 350)]);
        h.backend.set_discount("Member", 1000);
        let shell = shell(&h);

        let script = "reload\nnew\nname 1 Ana Souza\nselect 1 Coke\nadd 1\nselect 1 Chips\nadd 1\n\
                      close 1\ndiscount Member\namount cash 7.65\ntender cash on\nconfirm\nquit\nshow\n";
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("2 items, 1 discounts"));
        assert!(out.contains("Discount Member: R$ 7.65"));
        assert!(out.contains("✓ Ticket #1 settled: R$ 7.65 by cash"));
        // Lines after quit are not read
        assert!(!out.contains("== Expenses =="));

        let posted = h.backend.orders();
        assert_eq!(posted[0].customer_name, "Ana Souza");
    }

    #[tokio::test]
    async fn test_errors_are_notifications() {
        let h = Harness::new();
        let shell = shell(&h);

        match shell.handle_line("rm 1").await {
            Flow::Continue(text) => assert!(text.starts_with("✗ No ticket at position")),
            Flow::Quit => panic!("unexpected quit"),
        }
        assert_eq!(
            shell.handle_line("rm 0").await,
            Flow::Continue("✗ Positions start at 1".into())
        );
        assert_eq!(
            shell.handle_line("confirm").await,
            Flow::Continue("✗ No ticket is being closed".into())
        );
        match shell.handle_line("frobnicate").await {
            Flow::Continue(text) => assert!(text.contains("frobnicate")),
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_team_screen() {
        let h = Harness::new();
        h.roster_source.set_teams(vec![roster_team(
            "7",
            "Falcons",
            &[("Bia", Some("(11) 98888-0000")), ("Caio", None)],
        )]);
        let shell = shell(&h);

        match shell.handle_line("teams").await {
            Flow::Continue(text) => {
                assert_eq!(text, "1. Falcons  Bia  tel:11988880000")
            }
            Flow::Quit => panic!("unexpected quit"),
        }
        match shell.handle_line("team 1").await {
            Flow::Continue(text) => {
                assert!(text.contains("Bia  (11) 98888-0000"));
                assert!(text.contains("Caio  not provided"));
            }
            Flow::Quit => panic!("unexpected quit"),
        }
    }
}
