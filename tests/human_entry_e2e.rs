//! End-to-end tests of the human entry points
//!
//! Each test deals fixed hands, drives the `GameLoop` the way the console
//! does and checks the resulting state. Pacing is instant.

use kingdoms_duel::{
    core::{CardId, CardName, CharacterId, Side},
    game::{
        run_console, setup_opening_hands, DecisionOracle, GameConfig, GameEndReason,
        GameLogger, GameLoop, GameState, HandSetup, InteractionOutcome, OfflineOracle, Outcome,
        PendingInteraction, Phase, RulesConfig, ScriptedOracle, StepOutcome, Decision,
    },
};
use similar_asserts::assert_eq;
use std::sync::Arc;

fn setup_with(rules: RulesConfig, human: &str, opponent: &str, phase: Phase) -> GameState {
    let mut state = GameState::new_game(CharacterId::LiuBei, CharacterId::CaoCao, 21, rules);
    let human = HandSetup::parse(human).expect("valid hand");
    let opponent = HandSetup::parse(opponent).expect("valid hand");
    setup_opening_hands(&mut state, Some(&human), Some(&opponent)).expect("cards available");
    state.phase = phase;
    state
}

fn setup(human: &str, opponent: &str, phase: Phase) -> GameState {
    setup_with(RulesConfig::default(), human, opponent, phase)
}

fn start(state: GameState, oracle: Box<dyn DecisionOracle>) -> GameLoop {
    GameLoop::from_state(
        state,
        GameConfig::instant(),
        oracle,
        Arc::new(GameLogger::captured()),
    )
}

fn card(game: &GameLoop, side: Side, name: CardName) -> CardId {
    game.snapshot()
        .find_in_hand(side, name)
        .unwrap_or_else(|| panic!("{side} should hold {name}"))
}

#[tokio::test]
async fn test_slash_hits_opponent_without_dodge() {
    let mut game = start(setup("Slash", "Peach", Phase::PlayerPlay), Box::new(OfflineOracle));
    let slash = card(&game, Side::Human, CardName::Slash);

    assert_eq!(game.play_card(slash).await, Outcome::Applied);

    let state = game.snapshot();
    assert_eq!(state.opponent.hp, 3);
    assert_eq!(state.pending, None);
    assert_eq!(state.last_outcome, Some(InteractionOutcome::Failed));
    assert_eq!(state.phase, Phase::PlayerPlay);
    assert!(state.log.contains("Opponent took damage!"));
    assert!(state.discard.contains(slash));
}

#[tokio::test]
async fn test_slash_countered_by_dodge() {
    let mut game = start(setup("Slash", "Dodge", Phase::PlayerPlay), Box::new(OfflineOracle));
    let slash = card(&game, Side::Human, CardName::Slash);
    let dodge = card(&game, Side::Opponent, CardName::Dodge);

    game.play_card(slash).await;

    let state = game.snapshot();
    assert_eq!(state.opponent.hp, 4);
    assert!(state.opponent.hand.is_empty());
    assert!(state.discard.contains(dodge));
    assert_eq!(state.last_outcome, Some(InteractionOutcome::Countered));
    assert!(state.log.contains("Opponent played Dodge!"));
}

#[tokio::test]
async fn test_second_slash_is_rejected_without_state_change() {
    let mut game = start(
        setup("Slash;Slash", "Dodge", Phase::PlayerPlay),
        Box::new(OfflineOracle),
    );
    let first = card(&game, Side::Human, CardName::Slash);
    assert_eq!(game.play_card(first).await, Outcome::Applied);

    let before = game.snapshot();
    let second = card(&game, Side::Human, CardName::Slash);
    assert_eq!(game.play_card(second).await, Outcome::Rejected);
    let after = game.snapshot();

    assert_eq!(after.human, before.human);
    assert_eq!(after.opponent, before.opponent);
    assert_eq!(after.deck, before.deck);
    assert_eq!(after.discard, before.discard);
    assert_eq!(after.phase, before.phase);
    assert_eq!(after.pending, before.pending);
    assert_eq!(after.log.len(), before.log.len() + 1);
    assert_eq!(
        after.log.last().map(|e| e.text.as_str()),
        Some("You can only play one Slash per turn.")
    );
}

#[tokio::test]
async fn test_duel_against_opponent_without_slash() {
    let mut game = start(
        setup("Duel", "Dodge;Peach", Phase::PlayerPlay),
        Box::new(OfflineOracle),
    );
    let duel = card(&game, Side::Human, CardName::Duel);

    assert_eq!(game.play_card(duel).await, Outcome::Applied);

    let state = game.snapshot();
    assert_eq!(state.opponent.hp, 3);
    assert_eq!(state.opponent.hand.len(), 2);
    assert_eq!(state.pending, None);
    assert_eq!(state.last_outcome, Some(InteractionOutcome::Failed));
    assert_eq!(state.phase, Phase::PlayerPlay);
    assert!(state.log.contains("Waiting for Opponent to Duel back..."));
}

#[tokio::test]
async fn test_duel_answered_with_slash() {
    let mut game = start(setup("Duel", "Slash", Phase::PlayerPlay), Box::new(OfflineOracle));
    let duel = card(&game, Side::Human, CardName::Duel);

    game.play_card(duel).await;

    let state = game.snapshot();
    assert_eq!(state.opponent.hp, 4);
    assert!(state.opponent.hand.is_empty());
    assert_eq!(state.last_outcome, Some(InteractionOutcome::Countered));
    // Answering a Duel does not use up the opponent's Slash for the turn
    assert!(state.opponent.can_play_slash());
}

#[tokio::test]
async fn test_discard_down_to_hp() {
    let mut state = setup(
        "Slash;Slash;Dodge;Peach;Duel;Theft",
        "Dodge",
        Phase::PlayerPlay,
    );
    state.human.set_hp(3);
    let mut game = start(state, Box::new(OfflineOracle));

    assert_eq!(game.end_play_phase(), Outcome::Applied);
    assert_eq!(game.snapshot().phase, Phase::PlayerDiscard);
    assert!(game.snapshot().log.contains("discard 3 card(s)"));

    for round in 1..=3 {
        let first = game.snapshot().human.hand.cards[0];
        assert_eq!(game.discard_card(first), Outcome::Applied);
        let expected = if round < 3 {
            Phase::PlayerDiscard
        } else {
            Phase::OpponentThinking
        };
        assert_eq!(game.snapshot().phase, expected, "after discard {round}");
    }

    let state = game.snapshot();
    assert_eq!(state.human.hand.len(), 3);
    assert_eq!(state.discard.len(), 3);

    // The discard phase is over
    let extra = state.human.hand.cards[0];
    assert_eq!(game.discard_card(extra), Outcome::Ignored);
    assert_eq!(game.snapshot().human.hand.len(), 3);
}

#[tokio::test]
async fn test_human_answers_opponent_slash() {
    let state = setup("Dodge;Peach", "Slash", Phase::OpponentPlay);
    let slash = state.find_in_hand(Side::Opponent, CardName::Slash).expect("dealt");
    let oracle = ScriptedOracle::new(vec![Decision::play(slash, "Pressing the attack.")]);
    let mut game = start(state, Box::new(oracle));

    assert_eq!(game.run_until_human().await, StepOutcome::AwaitingHuman);
    let state = game.snapshot();
    assert_eq!(state.phase, Phase::ResolvingInteraction);
    assert_eq!(
        state.pending,
        Some(PendingInteraction::new(Side::Opponent, CardName::Slash).with_damage(1))
    );
    assert!(state.log.contains("WARNING: ATTACK! Play Dodge to evade!"));
    assert!(state.log.contains("Opponent plays Slash. Reasoning: Pressing the attack."));

    // Only the required card answers
    let before = game.snapshot();
    let peach = card(&game, Side::Human, CardName::Peach);
    assert_eq!(game.play_card(peach).await, Outcome::Rejected);
    let after = game.snapshot();
    assert_eq!(after.human, before.human);
    assert_eq!(after.pending, before.pending);
    assert!(after.log.contains("Invalid card! You need to play Dodge."));

    let dodge = card(&game, Side::Human, CardName::Dodge);
    assert_eq!(game.play_card(dodge).await, Outcome::Applied);
    let state = game.snapshot();
    assert_eq!(state.pending, None);
    assert_eq!(state.last_outcome, Some(InteractionOutcome::Countered));
    assert_eq!(state.phase, Phase::OpponentPlay);
    assert_eq!(state.human.hp, 4);

    // The opponent's turn finishes and ours begins
    assert_eq!(game.run_until_human().await, StepOutcome::AwaitingHuman);
    let state = game.snapshot();
    assert_eq!(state.phase, Phase::PlayerPlay);
    assert_eq!(state.turn, 1);
    assert_eq!(state.human.hand.len(), 3);
}

#[tokio::test]
async fn test_take_damage_instead() {
    let mut state = setup("Peach", "Dodge", Phase::ResolvingInteraction);
    state.pending = Some(PendingInteraction::new(Side::Opponent, CardName::Slash));
    let mut game = start(state, Box::new(OfflineOracle));

    assert_eq!(game.take_damage_instead(), Outcome::Applied);

    let state = game.snapshot();
    assert_eq!(state.human.hp, 3);
    assert_eq!(state.pending, None);
    assert_eq!(state.last_outcome, Some(InteractionOutcome::Failed));
    assert_eq!(state.phase, Phase::OpponentPlay);

    // Nothing left to take
    assert_eq!(game.take_damage_instead(), Outcome::Ignored);
    assert_eq!(game.snapshot().human.hp, 3);
}

#[tokio::test]
async fn test_taken_damage_comes_from_the_pending_attack() {
    let mut state = setup("Peach", "Dodge", Phase::ResolvingInteraction);
    state.pending = Some(PendingInteraction::new(Side::Opponent, CardName::Slash).with_damage(2));
    let mut game = start(state, Box::new(OfflineOracle));

    assert_eq!(game.take_damage_instead(), Outcome::Applied);
    assert_eq!(game.snapshot().human.hp, 2);
}

#[tokio::test]
async fn test_lethal_hit_ends_game_and_restart_recovers() {
    let mut state = setup("Peach", "Dodge", Phase::ResolvingInteraction);
    state.pending = Some(PendingInteraction::new(Side::Opponent, CardName::Duel));
    state.human.set_hp(1);
    let mut game = start(state, Box::new(OfflineOracle));

    game.take_damage_instead();
    let state = game.snapshot();
    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.winner, Some(Side::Opponent));

    assert_eq!(game.run_until_human().await, StepOutcome::Finished);
    let result = game.result();
    assert_eq!(result.winner, Some(Side::Opponent));
    assert_eq!(result.end_reason, GameEndReason::PlayerDeath(Side::Human));

    // Entry points do nothing once the game is over
    let peach = card(&game, Side::Human, CardName::Peach);
    assert_eq!(game.play_card(peach).await, Outcome::Ignored);
    assert_eq!(game.end_play_phase(), Outcome::Ignored);

    assert_eq!(game.restart(), Outcome::Applied);
    let state = game.snapshot();
    assert_eq!(state.phase, Phase::PlayerDraw);
    assert_eq!(state.winner, None);
    assert_eq!(state.human.hp, 4);
    assert_eq!(state.human.hand.len(), 4);
    assert_eq!(state.log.len(), 1);
}

#[tokio::test]
async fn test_entry_points_outside_their_phase() {
    let mut game = start(setup("Slash", "Dodge", Phase::OpponentThinking), Box::new(OfflineOracle));
    let slash = card(&game, Side::Human, CardName::Slash);
    let before = game.snapshot();

    assert_eq!(game.play_card(slash).await, Outcome::Ignored);
    assert_eq!(game.discard_card(slash), Outcome::Ignored);
    assert_eq!(game.end_play_phase(), Outcome::Ignored);
    assert_eq!(game.take_damage_instead(), Outcome::Ignored);

    let after = game.snapshot();
    assert_eq!(after.human, before.human);
    assert_eq!(after.phase, Phase::OpponentThinking);
    assert_eq!(after.log.len(), before.log.len() + 4);
}

#[tokio::test]
async fn test_card_not_in_hand_is_ignored() {
    let mut game = start(setup("Slash", "Dodge", Phase::PlayerPlay), Box::new(OfflineOracle));
    let theirs = card(&game, Side::Opponent, CardName::Dodge);

    assert_eq!(game.play_card(theirs).await, Outcome::Ignored);
    let state = game.snapshot();
    assert!(state.opponent.hand.contains(theirs));
    assert!(state.log.contains("is not in your hand"));
}

#[tokio::test]
async fn test_peach_heals_or_is_wasted() {
    let mut state = setup("Peach;Peach", "Dodge", Phase::PlayerPlay);
    state.human.set_hp(3);
    let mut game = start(state, Box::new(OfflineOracle));

    let first = card(&game, Side::Human, CardName::Peach);
    game.play_card(first).await;
    assert_eq!(game.snapshot().human.hp, 4);
    assert!(game.snapshot().log.contains("You recovered 1 HP."));

    let second = card(&game, Side::Human, CardName::Peach);
    game.play_card(second).await;
    let state = game.snapshot();
    assert_eq!(state.human.hp, 4);
    assert!(state.discard.contains(second));
    assert!(state.log.contains("HP is full. Peach wasted."));
}

#[tokio::test]
async fn test_sabotage_and_theft_discard_by_default() {
    let mut game = start(
        setup("Sabotage;Theft", "Dodge;Peach", Phase::PlayerPlay),
        Box::new(OfflineOracle),
    );

    let sabotage = card(&game, Side::Human, CardName::Sabotage);
    game.play_card(sabotage).await;
    assert_eq!(game.snapshot().opponent.hand.len(), 1);

    let theft = card(&game, Side::Human, CardName::Theft);
    game.play_card(theft).await;
    let state = game.snapshot();
    assert!(state.opponent.hand.is_empty());
    assert!(state.human.hand.is_empty());
    assert_eq!(state.discard.len(), 4);
}

#[tokio::test]
async fn test_theft_transfers_when_enabled() {
    let rules = RulesConfig {
        theft_transfers: true,
        ..RulesConfig::default()
    };
    let mut game = start(
        setup_with(rules, "Theft", "Peach", Phase::PlayerPlay),
        Box::new(OfflineOracle),
    );
    let peach = card(&game, Side::Opponent, CardName::Peach);
    let theft = card(&game, Side::Human, CardName::Theft);

    game.play_card(theft).await;
    let state = game.snapshot();
    assert_eq!(state.human.hand.cards, vec![peach]);
    assert!(state.opponent.hand.is_empty());
    assert!(state.log.contains("You used Theft and took Opponent's Peach!"));
}

#[tokio::test]
async fn test_volley_scrolls() {
    // Inert by default
    let mut game = start(setup("Barbarians", "Dodge", Phase::PlayerPlay), Box::new(OfflineOracle));
    let barbarians = card(&game, Side::Human, CardName::Barbarians);
    assert_eq!(game.play_card(barbarians).await, Outcome::Applied);
    let state = game.snapshot();
    assert_eq!(state.opponent.hp, 4);
    assert!(state.log.contains("Barbarians has no effect in a duel."));

    // Answered with Slash when enabled
    let rules = RulesConfig {
        volley_scrolls: true,
        ..RulesConfig::default()
    };
    let mut game = start(
        setup_with(rules, "Barbarians;Archery", "Dodge", Phase::PlayerPlay),
        Box::new(OfflineOracle),
    );
    let barbarians = card(&game, Side::Human, CardName::Barbarians);
    game.play_card(barbarians).await;
    assert_eq!(game.snapshot().opponent.hp, 3);

    let archery = card(&game, Side::Human, CardName::Archery);
    game.play_card(archery).await;
    let state = game.snapshot();
    assert_eq!(state.opponent.hp, 3);
    assert!(state.opponent.hand.is_empty());
    assert_eq!(state.last_outcome, Some(InteractionOutcome::Countered));
}

#[tokio::test]
async fn test_console_session() {
    let mut state = setup("Peach", "Dodge", Phase::PlayerPlay);
    state.human.set_hp(3);
    let mut game = start(state, Box::new(OfflineOracle));

    let input = "help\nbogus\nplay 5\nplay 0\nlog 3\nquit\n";
    let mut out = Vec::new();
    run_console(&mut game, input.as_bytes(), &mut out)
        .await
        .expect("console runs");
    let out = String::from_utf8(out).expect("utf-8 output");

    assert!(out.contains("Commands:"));
    assert!(out.contains("unknown command 'bogus'"));
    assert!(out.contains("No card at that position."));
    assert!(out.contains("You recovered 1 HP."));
    assert_eq!(game.snapshot().human.hp, 4);
    assert!(game.snapshot().human.hand.is_empty());
}
