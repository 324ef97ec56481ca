//! Interactive console for the human seat
//!
//! Reads commands line by line, applies them through the `GameLoop` entry
//! points and renders the table between commands. Narrated events are
//! printed by the store's logger as they happen.

use crate::core::{CardId, Side};
use crate::game::game_loop::{GameLoop, Outcome, StepOutcome};
use crate::game::phase::Phase;
use crate::game::GameState;
use crate::{DuelError, Result};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt, value, verify},
    sequence::{delimited, preceded},
    IResult,
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// A card named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRef {
    /// 0-based position in hand
    Index(usize),
    /// `#id`
    Id(CardId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(CardRef),
    Discard(CardRef),
    Take,
    End,
    State,
    /// Show the last N log entries
    Log(Option<usize>),
    Restart,
    Help,
    Quit,
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn card_ref(input: &str) -> IResult<&str, CardRef> {
    alt((
        map(
            preceded(char('#'), map_res(digit1, str::parse::<u32>)),
            |id| CardRef::Id(CardId::new(id)),
        ),
        map(number, CardRef::Index),
    ))(input)
}

/// A whole word that is one of `words` (case-insensitive)
fn keyword<'a>(words: &'static [&'static str]) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    verify(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '?'),
        move |word: &str| words.iter().any(|k| k.eq_ignore_ascii_case(word)),
    )
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        map(
            preceded(keyword(&["play", "p"]), preceded(multispace1, card_ref)),
            Command::Play,
        ),
        map(
            preceded(keyword(&["discard", "d"]), preceded(multispace1, card_ref)),
            Command::Discard,
        ),
        map(
            preceded(keyword(&["log", "l"]), opt(preceded(multispace1, number))),
            Command::Log,
        ),
        value(Command::Take, keyword(&["take", "t"])),
        value(Command::End, keyword(&["end", "e"])),
        value(Command::State, keyword(&["state", "s"])),
        value(Command::Restart, keyword(&["restart", "r"])),
        value(Command::Help, keyword(&["help", "h", "?"])),
        value(Command::Quit, keyword(&["quit", "exit", "q"])),
    ))(input)
}

/// Parse one console line
pub fn parse_command(input: &str) -> Result<Command> {
    all_consuming(delimited(multispace0, command, multispace0))(input)
        .map(|(_, command)| command)
        .map_err(|_| DuelError::ParseError(format!("unknown command '{}'", input.trim())))
}

const HELP: &str = "\
Commands:
  play <n> | play #<id>   play the n-th card in your hand (0-based) or a card by id
  discard <n>             discard during your discard phase
  take                    take the damage instead of answering an attack
  end                     end your play phase
  state                   show the table
  log [n]                 show the last n log entries (default 10)
  restart                 start a new game
  help                    this text
  quit                    leave";

/// Render the table as the human sees it
pub fn render_table(state: &GameState) -> String {
    let mut out = String::new();
    let bar = |hp: u8, max: u8| {
        format!(
            "{}{}",
            "♥".repeat(hp as usize),
            "·".repeat(max.saturating_sub(hp) as usize)
        )
    };

    out.push_str(&format!("Turn {} | {}\n", state.turn, state.phase));
    let foe = &state.opponent;
    out.push_str(&format!(
        "Opponent {:<10} {} {}/{}  hand: {}\n",
        foe.name(),
        bar(foe.hp, foe.max_hp()),
        foe.hp,
        foe.max_hp(),
        foe.hand.len()
    ));
    let me = &state.human;
    out.push_str(&format!(
        "You      {:<10} {} {}/{}  deck: {}  discard: {}\n",
        me.name(),
        bar(me.hp, me.max_hp()),
        me.hp,
        me.max_hp(),
        state.deck.len(),
        state.discard.len()
    ));
    if let Some(pending) = state.pending {
        out.push_str(&format!(
            "Pending: {} from {}; answer with {}\n",
            pending.card,
            pending.source,
            pending.required()
        ));
    }
    for (idx, card) in state.hand_cards(Side::Human).iter().enumerate() {
        out.push_str(&format!(
            "  [{idx}] #{:<3} {:<18} {}\n",
            card.id,
            card.to_string(),
            card.description()
        ));
    }
    out
}

fn prompt_for(phase: Phase) -> &'static str {
    match phase {
        Phase::PlayerPlay => "Your move (play <n>, end, help)",
        Phase::PlayerDiscard => "Too many cards (discard <n>)",
        Phase::ResolvingInteraction => "You are attacked! (play <n> or take)",
        Phase::GameOver => "Game over (restart or quit)",
        _ => "Waiting",
    }
}

/// Resolve a card reference against the current hand
fn resolve_ref(state: &GameState, card: CardRef) -> Option<CardId> {
    match card {
        CardRef::Index(idx) => state.human.hand.cards.get(idx).copied(),
        CardRef::Id(id) => Some(id),
    }
}

/// Run the console until `quit` or end of input
pub async fn run_console<R, W>(game: &mut GameLoop, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{HELP}")?;

    loop {
        let progress = game.run_until_human().await;
        let state = game.snapshot();
        if progress == StepOutcome::Finished {
            let result = game.result();
            writeln!(
                out,
                "Winner: {}",
                result.winner.map(|s| s.subject()).unwrap_or("nobody")
            )?;
        }
        write!(out, "{}", render_table(&state))?;
        write!(out, "{}> ", prompt_for(state.phase))?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e} (type 'help')")?;
                continue;
            }
        };

        let outcome = match command {
            Command::Play(card) | Command::Discard(card) => {
                let Some(card_id) = resolve_ref(&state, card) else {
                    writeln!(out, "No card at that position.")?;
                    continue;
                };
                // In the discard phase "play" means discard, like clicking a card
                if matches!(command, Command::Discard(_)) || state.phase == Phase::PlayerDiscard {
                    game.discard_card(card_id)
                } else {
                    game.play_card(card_id).await
                }
            }
            Command::Take => game.take_damage_instead(),
            Command::End => game.end_play_phase(),
            Command::Restart => game.restart(),
            Command::State => {
                write!(out, "{}", render_table(&state))?;
                continue;
            }
            Command::Log(count) => {
                let count = count.unwrap_or(10);
                let entries = state.log.entries();
                for entry in &entries[entries.len().saturating_sub(count)..] {
                    writeln!(out, "[t{} {:>6}ms] {}", entry.turn, entry.elapsed_ms, entry.text)?;
                }
                continue;
            }
            Command::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Command::Quit => break,
        };

        if outcome != Outcome::Applied {
            if let Some(entry) = game.snapshot().log.last() {
                writeln!(out, "({})", entry.text)?;
            }
        }
    }
    Ok(())
}
