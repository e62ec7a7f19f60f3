//! Simultaneous action tests.
//!
//! These tests verify support for steps where several players are
//! eligible to act at once (like Sushi Go picks or sealed bids).

mod common;

use common::{logged, p, Table};
use turn_flow::actions::Selection;
use turn_flow::core::{FlowError, PlayerId, RawArgs};
use turn_flow::flow::{FlowDefinition, FlowEngine, FlowNode, FlowState, SimultaneousStepNode};

fn no_args() -> RawArgs {
    RawArgs::new()
}

fn awaiting(state: &FlowState) -> Vec<PlayerId> {
    state.awaiting_players.iter().map(|a| a.player).collect()
}

fn engine(step: SimultaneousStepNode<Table>) -> FlowEngine<Table> {
    FlowEngine::new(FlowDefinition::new(step))
}

/// Every player acts once, in any order, then the step completes.
#[test]
fn test_all_players_act_once() {
    let mut table = Table::with_actions(4, &["pick"]);
    let mut engine = engine(SimultaneousStepNode::new(["pick"]).prompt("Pick a card"));

    let state = engine.start(&mut table).unwrap();
    assert_eq!(awaiting(&state), PlayerId::all(4).collect::<Vec<_>>());
    assert_eq!(state.prompt.as_deref(), Some("Pick a card"));
    assert!(state.available_actions.is_empty());

    for player in [p(2), p(0), p(3)] {
        let outcome = engine.resume(&mut table, "pick", &no_args(), Some(player)).unwrap();
        assert!(outcome.result.success);
        assert!(!awaiting(&outcome.state).contains(&player));
    }

    // Only one player left, so the player can be omitted
    let outcome = engine.resume(&mut table, "pick", &no_args(), None).unwrap();
    assert!(outcome.state.complete);
    assert_eq!(table.players_in_order(), vec![p(2), p(0), p(3), p(1)]);
}

/// Naming a player who is not awaiting is fatal.
#[test]
fn test_player_not_awaiting() {
    let mut table = Table::with_actions(3, &["pick"]);
    let mut engine = engine(SimultaneousStepNode::new(["pick"]));
    engine.start(&mut table).unwrap();

    engine.resume(&mut table, "pick", &no_args(), Some(p(1))).unwrap();
    let err = engine.resume(&mut table, "pick", &no_args(), Some(p(1))).unwrap_err();

    assert!(matches!(err, FlowError::PlayerNotAwaiting { player } if player == p(1)));
}

/// With several players awaiting, the player must be named.
#[test]
fn test_ambiguous_player() {
    let mut table = Table::with_actions(3, &["pick"]);
    let mut engine = engine(SimultaneousStepNode::new(["pick"]));
    engine.start(&mut table).unwrap();

    let err = engine.resume(&mut table, "pick", &no_args(), None).unwrap_err();

    assert!(matches!(err, FlowError::PlayerNotAwaiting { .. }));
    assert!(table.log.is_empty());
}

/// Each player may make several moves before being done.
#[test]
fn test_max_moves_per_player() {
    let mut table = Table::with_actions(2, &["bid"]);
    let mut engine = engine(SimultaneousStepNode::new(["bid"]).max_moves(2));
    engine.start(&mut table).unwrap();

    engine.resume(&mut table, "bid", &no_args(), Some(p(0))).unwrap();
    let state = engine.resume(&mut table, "bid", &no_args(), Some(p(0))).unwrap().state;
    assert_eq!(awaiting(&state), vec![p(1)]);

    engine.resume(&mut table, "bid", &no_args(), Some(p(1))).unwrap();
    let state = engine.resume(&mut table, "bid", &no_args(), Some(p(1))).unwrap().state;
    assert!(state.complete);
}

/// skip_player and a players list narrow the participants.
#[test]
fn test_participants() {
    let mut table = Table::with_actions(5, &["pick"]);
    let step = SimultaneousStepNode::new(["pick"])
        .players(|_| vec![p(1), p(2), p(4)])
        .skip_player(|_, player| player == p(2));
    let mut engine = engine(step);

    let state = engine.start(&mut table).unwrap();

    assert_eq!(awaiting(&state), vec![p(1), p(4)]);
}

/// player_done finishes a player early.
#[test]
fn test_player_done_predicate() {
    let mut table = Table::with_actions(2, &["bid", "fold"]);
    let step = SimultaneousStepNode::<Table>::new(["bid", "fold"])
        .max_moves(5)
        .player_done(|ctx, player| ctx.host().actions_by(player).iter().any(|a| a == "fold"));
    let mut engine = engine(step);
    engine.start(&mut table).unwrap();

    let state = engine.resume(&mut table, "fold", &no_args(), Some(p(0))).unwrap().state;
    assert_eq!(awaiting(&state), vec![p(1)]);

    let state = engine.resume(&mut table, "bid", &no_args(), Some(p(1))).unwrap().state;
    assert_eq!(awaiting(&state), vec![p(1)]);
}

/// all_done ends the step for everyone.
#[test]
fn test_all_done_guard() {
    let mut table = Table::with_actions(4, &["buzz"]);
    let step = SimultaneousStepNode::<Table>::new(["buzz"]).all_done(|ctx| ctx.host().counter("buzz") >= 1);
    let def = FlowDefinition::new(FlowNode::sequence([
        step.into(),
        FlowNode::execute(|ctx| ctx.set("after", true)),
    ]));
    let mut engine = FlowEngine::new(def);
    engine.start(&mut table).unwrap();

    let state = engine.resume(&mut table, "buzz", &no_args(), Some(p(3))).unwrap().state;

    assert!(state.complete);
    assert_eq!(table.log.len(), 1);
    assert!(engine.variables().contains_key("after"));
}

/// A player with nothing to do is done without being asked.
#[test]
fn test_player_without_actions_is_done() {
    let mut table = Table::with_actions(3, &["pick"]);
    table.benched.push(p(1));
    let mut engine = engine(SimultaneousStepNode::new(["pick"]));

    let state = engine.start(&mut table).unwrap();

    assert_eq!(awaiting(&state), vec![p(0), p(2)]);
}

/// A failed action leaves the player awaiting.
#[test]
fn test_failed_action_keeps_player_awaiting() {
    let mut table = Table::new(2);
    table
        .registry
        .register(logged("bid").selection(Selection::number("amount").range(Some(1.0), None)));
    let mut engine = engine(SimultaneousStepNode::new(["bid"]));
    engine.start(&mut table).unwrap();

    let mut args = RawArgs::new();
    args.insert("amount".to_string(), serde_json::json!(0));
    let outcome = engine.resume(&mut table, "bid", &args, Some(p(1))).unwrap();

    assert!(!outcome.result.success);
    assert_eq!(awaiting(&outcome.state), vec![p(0), p(1)]);
}
