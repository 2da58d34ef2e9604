use crate::abilities::{CardAction, TargetPlayer, TargetSpec};
use crate::actions::GameAction;
use crate::cards::{CardDefinition, CardType, StatValue, TokenKind};
use crate::costs::Cost;
use crate::dice::{DiceCount, Magic};
use crate::effects::{Amount, Effect, Relation, Stat};
use crate::events::EventName;
use crate::triggers::{TriggerCondition, TriggeredAbility};
use crate::zones::Location;

pub fn silver_snake() -> CardDefinition {
    CardDefinition::new("silver-snake", "Silver Snake", CardType::Conjuration)
        .with_attack(StatValue::Variable)
        .with_life(3)
        .with_recover(0)
        .with_setup(|ability| {
            ability.persistent_effect(Effect::set_stat(
                Stat::Attack,
                Amount::SourceTokens(TokenKind::Status),
            ))?;
            ability.forced_reaction(
                TriggeredAbility::new("Consume")
                    .on(
                        EventName::OnCardDestroyed,
                        TriggerCondition::All(vec![
                            TriggerCondition::EventCardControlledBy(Relation::Opponent),
                            TriggerCondition::EventCardIsUnit,
                        ]),
                    )
                    .with_action(GameAction::add_status_token()),
            )
        })
}

pub fn summon_masked_wolf() -> CardDefinition {
    CardDefinition::new("summon-masked-wolf", "Summon Masked Wolf", CardType::ReadySpell)
        .with_cost(DiceCount::class(1, Magic::Illusion))
        .with_setup(|ability| {
            ability.action(
                CardAction::new("Summon False Demon")
                    .with_cost(Cost::SideAction)
                    .with_cost(Cost::Exhaust)
                    .with_cost(Cost::dice([DiceCount::class(1, Magic::Illusion)]))
                    .in_location(Location::Spellboard)
                    .with_target(
                        TargetSpec::new()
                            .with_player(TargetPlayer::Own)
                            .with_card_type(CardType::Conjuration)
                            .in_location(Location::Archives)
                            .with_condition(|state, card| {
                                state
                                    .try_card(card)
                                    .map_or(false, |c| c.stub() == "masked-wolf")
                            }),
                    )
                    .with_action(GameAction::put_into_play()),
            )
        })
}

pub fn masked_wolf() -> CardDefinition {
    CardDefinition::new("masked-wolf", "Masked Wolf", CardType::Conjuration)
        .with_attack(2)
        .with_life(1)
        .with_recover(0)
}
