use std::{
    collections::{HashMap, HashSet},
    io::{self, Write},
};

use itertools::Itertools;
use regex::Regex;
use types::{
    CardTargetSelector, GameBoardData, GamePlayAction, GameState, InGameCard, PlayDecision,
    PluginBase, PluginInfo, PluginKind, StrategyPlugin,
};

/// Asks a human on the console for every decision.
#[derive(Debug, Default)]
pub struct InputStrategy {}

impl PluginBase for InputStrategy {
    fn plugin_information(&self) -> PluginInfo {
        PluginInfo {
            name: "Input".to_string(),
            kind: PluginKind::Strategy,
            description: "Prompts on stdin for each decision".to_string(),
            source_code_link: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StrategyPlugin for InputStrategy {
    fn mulligan(&mut self, mulligan_cards: &[InGameCard]) -> Vec<InGameCard> {
        println!("Mulligan: {}", list_cards(mulligan_cards));
        prompt("Cards to replace? (ids, 'all' or 'none')", |input| {
            parse_card_selection(input, mulligan_cards)
        })
        .unwrap_or_default()
    }

    fn play_hand_card(
        &mut self,
        board_data: &GameBoardData,
        game_state: GameState,
        mana: u32,
        spell_mana: u32,
    ) -> PlayDecision {
        print_board(board_data);
        let playable = self.get_playable_hand_cards(&board_data.cards, mana, spell_mana);
        println!("[{game_state}] Playable: {}", list_cards(&playable));
        if playable.is_empty() {
            log::info!("Nothing playable with {mana} mana and {spell_mana} spell mana");
            return PlayDecision::Pass;
        }
        prompt(
            "Play? ('pass' or 'play <id> [target nexus|opponent nexus|hand:<id>|<id>, ...]')",
            |input| parse_play(input, board_data, &playable),
        )
        .unwrap_or_default()
    }

    fn block(
        &mut self,
        board_data: &GameBoardData,
        _spells_to_use: &mut Vec<CardTargetSelector>,
    ) -> HashMap<InGameCard, InGameCard> {
        print_board(board_data);
        prompt("Blocks? ('<attacker>:<blocker> ...' or 'none')", |input| {
            parse_blocks(input, board_data)
        })
        .unwrap_or_default()
    }

    fn respond_to_opponent_action(
        &mut self,
        board_data: &GameBoardData,
        game_state: GameState,
        _mana: u32,
        _spell_mana: u32,
    ) -> GamePlayAction {
        print_board(board_data);
        println!("Opponent acted during {game_state}");
        prompt("Respond? (attack | play | skip)", parse_action).unwrap_or(GamePlayAction::Skip)
    }

    fn attack_token_usage(
        &mut self,
        board_data: &GameBoardData,
        _mana: u32,
        _spell_mana: u32,
    ) -> GamePlayAction {
        print_board(board_data);
        prompt("Attack token? (attack | play | skip)", parse_action).unwrap_or(GamePlayAction::Skip)
    }

    fn attack(
        &mut self,
        _board_data: &GameBoardData,
        player_board_cards: &[InGameCard],
    ) -> Vec<InGameCard> {
        println!("Your board: {}", list_cards(player_board_cards));
        prompt("Attack with? (ids, 'all' or 'none')", |input| {
            parse_card_selection(input, player_board_cards)
        })
        .unwrap_or_default()
    }
}

fn list_cards(cards: &[InGameCard]) -> String {
    cards
        .iter()
        .map(|card| format!("#{} {}", card.card_id, card.card))
        .join(" || ")
}

fn print_board(board_data: &GameBoardData) {
    let cards = &board_data.cards;
    println!(
        "Nexus {} vs {} | mana {} (+{} spell)",
        board_data.nexus_health,
        board_data.opponent_nexus_health,
        board_data.mana,
        board_data.spell_mana
    );
    println!("Opponent attacking/blocking: {}", list_cards(&cards.opponent_cards_attack_or_block));
    println!("Opponent board: {}", list_cards(&cards.opponent_cards_board));
    println!("Spell stack: {}", list_cards(&cards.spell_stack));
    println!("Your attacking/blocking: {}", list_cards(&cards.cards_attack_or_block));
    println!("Your board: {}", list_cards(&cards.cards_board));
    println!("Your hand: {}", list_cards(&cards.cards_hand));
}

/// Re-asks until `parse` accepts the line. `None` once stdin is closed.
fn prompt<T>(question: &str, parse: impl Fn(&str) -> Result<T, String>) -> Option<T> {
    let mut buf = String::new();
    loop {
        print!("{question} >> ");
        let _ = io::stdout().flush();
        buf.clear();
        match io::stdin().read_line(&mut buf) {
            Ok(0) => {
                log::warn!("stdin closed, declining the decision");
                return None;
            }
            Ok(_) => match parse(&buf) {
                Ok(value) => return Some(value),
                Err(err) => log::error!("Error parsing message from stdin: {err}"),
            },
            Err(err) => {
                log::error!("Error reading line from stdin: {err}");
                return None;
            }
        }
    }
}

fn parse_card_id(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|err| format!("Unable to parse card id from {s:?}: {err}"))
}

fn find_card<'a>(cards: &'a [InGameCard], card_id: u32) -> Option<&'a InGameCard> {
    cards.iter().find(|card| card.card_id == card_id)
}

pub(crate) fn parse_card_selection(
    input: &str,
    candidates: &[InGameCard],
) -> Result<Vec<InGameCard>, String> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "" | "none" => return Ok(vec![]),
        "all" => return Ok(candidates.to_vec()),
        _ => {}
    }

    let list_re = Regex::new(r"^\d+(?:[,\s]+\d+)*$").expect("Valid id list regex");
    if !list_re.is_match(&input) {
        return Err(format!("Expected a list of card ids, got {input:?}"));
    }

    let id_re = Regex::new(r"\d+").expect("Valid id regex");
    let mut selected = Vec::new();
    for id in id_re.find_iter(&input) {
        let card_id = parse_card_id(id.as_str())?;
        let card = find_card(candidates, card_id)
            .ok_or_else(|| format!("Card #{card_id} is not one of the offered cards"))?;
        if !selected.contains(card) {
            selected.push(card.clone());
        }
    }
    Ok(selected)
}

pub(crate) fn parse_action(input: &str) -> Result<GamePlayAction, String> {
    let input = input.trim().to_lowercase();
    let re = Regex::new(r"^(?<action>attack|play|skip)$").expect("Valid action regex");
    let caps = re
        .captures(&input)
        .ok_or_else(|| format!("Unable to parse an action from {input:?}"))?;
    match &caps["action"] {
        "attack" => Ok(GamePlayAction::Attack),
        "play" => Ok(GamePlayAction::PlayCards),
        _ => Ok(GamePlayAction::Skip),
    }
}

pub(crate) fn parse_play(
    input: &str,
    board_data: &GameBoardData,
    playable: &[InGameCard],
) -> Result<PlayDecision, String> {
    let input = input.trim().to_lowercase();
    if input == "pass" {
        return Ok(PlayDecision::Pass);
    }

    let re = Regex::new(r"^play\s+(?<card>\d+)(?:\s+target\s+(?<targets>.+))?$")
        .expect("Valid play regex");
    let caps = re
        .captures(&input)
        .ok_or_else(|| format!("Unable to parse a play from {input:?}"))?;

    let card_id = parse_card_id(&caps["card"])?;
    let card = find_card(playable, card_id)
        .ok_or_else(|| format!("Card #{card_id} is not playable right now"))?
        .clone();

    let Some(targets) = caps.name("targets") else {
        return Ok(PlayDecision::play(card));
    };

    let cards = &board_data.cards;
    let hand_re = Regex::new(r"^hand:(?<id>\d+)$").expect("Valid hand target regex");
    let mut selector = CardTargetSelector::new(card.clone());
    for token in targets.as_str().split(',').map(str::trim) {
        selector = match token {
            "nexus" => selector.add_target_nexus(),
            "opponent nexus" | "opponent-nexus" => selector.add_target_opponent_nexus(),
            _ => {
                if let Some(hand_caps) = hand_re.captures(token) {
                    let target_id = parse_card_id(&hand_caps["id"])?;
                    let target = find_card(&cards.cards_hand, target_id)
                        .or_else(|| find_card(&cards.opponent_cards_hand, target_id))
                        .ok_or_else(|| format!("Card #{target_id} is not in a hand"))?;
                    selector.add_target_hand_card(target.clone())
                } else {
                    let target_id = parse_card_id(token)?;
                    let target = cards
                        .find(target_id)
                        .ok_or_else(|| format!("Card #{target_id} is not on the board"))?;
                    selector.add_target(target.clone())
                }
            }
        };
    }
    Ok(PlayDecision::play_targeted(card, selector))
}

pub(crate) fn parse_blocks(
    input: &str,
    board_data: &GameBoardData,
) -> Result<HashMap<InGameCard, InGameCard>, String> {
    let input = input.trim().to_lowercase();
    if input.is_empty() || input == "none" {
        return Ok(HashMap::new());
    }

    let re = Regex::new(r"(?<attacker>\d+)\s*:\s*(?<blocker>\d+)").expect("Valid block regex");
    let cards = &board_data.cards;
    let mut blocks = HashMap::new();
    let mut used_blockers = HashSet::new();
    for caps in re.captures_iter(&input) {
        let attacker_id = parse_card_id(&caps["attacker"])?;
        let blocker_id = parse_card_id(&caps["blocker"])?;
        let attacker = find_card(&cards.opponent_cards_attack_or_block, attacker_id)
            .ok_or_else(|| format!("Card #{attacker_id} is not attacking"))?;
        let blocker = find_card(&cards.cards_board, blocker_id)
            .ok_or_else(|| format!("Card #{blocker_id} is not on your board"))?;
        if !used_blockers.insert(blocker_id) {
            return Err(format!("Card #{blocker_id} can only block once"));
        }
        if blocks.insert(attacker.clone(), blocker.clone()).is_some() {
            return Err(format!("Card #{attacker_id} can only be blocked once"));
        }
    }

    if blocks.is_empty() {
        return Err(format!("Unable to parse any '<attacker>:<blocker>' pair from {input:?}"));
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BoardCards, CardTarget, CardType, GameCard, InGameCardPosition};

    fn card(card_id: u32, position: InGameCardPosition, local: bool) -> InGameCard {
        InGameCard::new(
            GameCard::new("Card", "01XX000", 2, 2, 2, CardType::Unit),
            card_id,
            position,
            local,
        )
    }

    fn board() -> GameBoardData {
        GameBoardData {
            cards: BoardCards::from_cards(vec![
                card(1, InGameCardPosition::Hand, true),
                card(2, InGameCardPosition::Board, true),
                card(3, InGameCardPosition::Board, true),
                card(7, InGameCardPosition::OpponentAttackOrBlock, false),
                card(8, InGameCardPosition::OpponentAttackOrBlock, false),
                card(9, InGameCardPosition::OpponentHand, false),
            ]),
            mana: 3,
            ..Default::default()
        }
    }

    #[test]
    fn selection_accepts_ids_all_and_none() {
        let offered = vec![
            card(1, InGameCardPosition::Mulligan, true),
            card(2, InGameCardPosition::Mulligan, true),
        ];
        assert_eq!(parse_card_selection("none\n", &offered), Ok(vec![]));
        assert_eq!(parse_card_selection("ALL", &offered), Ok(offered.clone()));
        assert_eq!(
            parse_card_selection("2, 2", &offered),
            Ok(vec![offered[1].clone()])
        );
        assert!(parse_card_selection("5", &offered).is_err());
        assert!(parse_card_selection("one", &offered).is_err());
    }

    #[test]
    fn actions_parse_case_insensitively() {
        assert_eq!(parse_action("Attack\n"), Ok(GamePlayAction::Attack));
        assert_eq!(parse_action("play"), Ok(GamePlayAction::PlayCards));
        assert_eq!(parse_action(" skip "), Ok(GamePlayAction::Skip));
        assert!(parse_action("surrender").is_err());
    }

    #[test]
    fn play_with_targets_keeps_their_order() {
        let board_data = board();
        let playable = board_data.cards.cards_hand.clone();

        let decision = parse_play("play 1 target nexus, 8, hand:9", &board_data, &playable)
            .expect("valid play");
        let (card, selector) = match decision {
            PlayDecision::Play {
                card,
                target: Some(selector),
            } => (card, selector),
            other => panic!("expected a targeted play, got {other:?}"),
        };
        assert_eq!(card.card_id, 1);
        let kinds: Vec<_> = selector.targets().iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![CardTarget::Nexus, CardTarget::Card, CardTarget::HandCard]
        );
    }

    #[test]
    fn play_rejects_unplayable_cards() {
        let board_data = board();
        let playable = board_data.cards.cards_hand.clone();
        assert!(parse_play("play 2", &board_data, &playable).is_err());
        assert_eq!(
            parse_play("pass", &board_data, &playable),
            Ok(PlayDecision::Pass)
        );
    }

    #[test]
    fn blocks_use_each_blocker_once() {
        let board_data = board();
        let blocks = parse_blocks("7:2 8:3", &board_data).expect("valid blocks");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[&card(7, InGameCardPosition::Unknown, false)].card_id, 2);

        assert!(parse_blocks("7:2 8:2", &board_data).is_err());
        assert!(parse_blocks("2:7", &board_data).is_err());
    }

    #[test]
    fn blocks_use_each_attacker_once() {
        let board_data = board();
        assert_eq!(
            parse_blocks("7:2 7:3", &board_data),
            Err("Card #7 can only be blocked once".to_string())
        );
        assert_eq!(parse_blocks("none", &board_data), Ok(HashMap::new()));
    }
}
