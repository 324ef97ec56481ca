//! Card effects
//!
//! Playing a card is two steps: `Action::PlayCard` moves it to the discard
//! pile, then `resolve_effect` applies what it does. Attacks need further
//! asynchronous steps, which is why the effect is not part of the reducer.

use crate::core::{CardName, Side};
use crate::game::actions::Action;
use crate::game::game_loop::GameLoop;
use crate::game::interaction::AttackOutcome;
use crate::game::logger::LogKind;

impl GameLoop {
    /// Apply the effect of a card `side` has just played
    ///
    /// Returns how the attack went when the card opened one.
    pub(crate) async fn resolve_effect(
        &mut self,
        side: Side,
        card: CardName,
    ) -> Option<AttackOutcome> {
        let state = self.store.snapshot();
        let rules = state.rules;

        match card {
            CardName::Slash => {
                self.store.dispatch(Action::RecordSlash { side });
                return Some(self.handle_attack(side, card).await);
            }
            // Single exchange: one Slash answers it
            CardName::Duel => {
                return Some(self.handle_attack(side, card).await);
            }
            CardName::Peach => {
                if state.player(side).is_wounded() {
                    self.store.dispatch(Action::Heal {
                        side,
                        amount: rules.peach_heal,
                    });
                    self.say(
                        LogKind::Success,
                        format!("{} recovered {} HP.", side.subject(), rules.peach_heal),
                    );
                } else {
                    self.say(LogKind::Info, "HP is full. Peach wasted.");
                }
            }
            CardName::Sabotage => {
                self.store.dispatch(Action::DiscardRandom { actor: side, card });
            }
            CardName::Theft => {
                if rules.theft_transfers {
                    self.store.dispatch(Action::StealRandom { actor: side, card });
                } else {
                    self.store.dispatch(Action::DiscardRandom { actor: side, card });
                }
            }
            CardName::Dodge => {
                self.say(LogKind::Info, "Dodge does nothing without an attack to evade.");
            }
            CardName::Barbarians | CardName::Archery => {
                if rules.volley_scrolls {
                    return Some(self.handle_attack(side, card).await);
                }
                self.say(LogKind::Info, format!("{card} has no effect in a duel."));
            }
        }
        None
    }
}
