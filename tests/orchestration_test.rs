//! Strategy behavior across a multi-agent roster

mod common;

use agenthive::bus::MessageKind;
use agenthive::orchestrator::{OrchestrationStatus, Orchestrator, Strategy};
use common::{make_agent, FixedModel, ScriptedModel, TagModel};
use std::collections::HashSet;

#[tokio::test]
async fn sequential_composes_outputs_in_registration_order() {
    let mut orch = Orchestrator::new(FixedModel::new("unused coordinator"));
    orch.register_agent(make_agent("a", "first stage", TagModel::new("A")))
        .unwrap();
    orch.register_agent(make_agent("b", "second stage", TagModel::new("B")))
        .unwrap();
    orch.register_agent(make_agent("c", "third stage", TagModel::new("C")))
        .unwrap();

    let result = orch.run_task("X", Strategy::Sequential).await;

    assert_eq!(result.status, OrchestrationStatus::Completed);
    assert_eq!(result.synthesis.as_deref(), Some("C(B(A(X)))"));
    assert_eq!(result.turns, 3);
    assert_eq!(result.individual_results[1].output, "B(A(X))");

    // handoffs are observable as direct messages on the bus
    let history = orch.bus().history();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|m| m.kind == MessageKind::Direct));
    assert_eq!(history[1].sender, "a");
    assert_eq!(history[1].receiver.as_deref(), Some("b"));
    assert_eq!(history[1].payload, "A(X)");
}

#[tokio::test]
async fn sequential_stops_at_first_failed_stage() {
    let mut orch = Orchestrator::new(FixedModel::new("unused coordinator"));
    orch.register_agent(make_agent("a", "first stage", TagModel::new("A")))
        .unwrap();
    // empty script: this agent's model errors immediately
    orch.register_agent(make_agent("b", "broken stage", ScriptedModel::new(vec![])))
        .unwrap();
    orch.register_agent(make_agent("c", "third stage", TagModel::new("C")))
        .unwrap();

    let result = orch.run_task("X", Strategy::Sequential).await;

    assert_eq!(result.status, OrchestrationStatus::Failed);
    assert_eq!(result.turns, 2);
    assert_eq!(result.individual_results.len(), 2);
    assert!(!result.individual_results[1].success);
}

#[tokio::test]
async fn parallel_covers_planned_agents_regardless_of_order() {
    let plan = r#"[
        {"agent": "beta",  "subtask": "handle part two"},
        {"agent": "alpha", "subtask": "handle part one"},
        {"agent": "ghost", "subtask": "not a real agent"}
    ]"#;
    let coordinator = ScriptedModel::texts(&[plan, "combined answer"]);

    let mut orch = Orchestrator::new(coordinator);
    orch.register_agent(make_agent("alpha", "researcher", FixedModel::new("alpha result")))
        .unwrap();
    orch.register_agent(make_agent("beta", "writer", FixedModel::new("beta result")))
        .unwrap();

    let result = orch.run_task("big task", Strategy::Parallel).await;

    assert_eq!(result.status, OrchestrationStatus::Completed);
    assert_eq!(result.synthesis.as_deref(), Some("combined answer"));

    // the unknown agent is skipped; both real agents are covered exactly once
    let names: HashSet<&str> = result
        .individual_results
        .iter()
        .map(|r| r.agent.as_str())
        .collect();
    assert_eq!(names, HashSet::from(["alpha", "beta"]));
    assert!(result.individual_results.iter().all(|r| r.success));
}

#[tokio::test]
async fn parallel_failed_branch_does_not_cancel_siblings() {
    let plan = r#"[
        {"agent": "alpha", "subtask": "part one"},
        {"agent": "beta",  "subtask": "part two"}
    ]"#;
    let coordinator = ScriptedModel::texts(&[plan, "partial synthesis"]);

    let mut orch = Orchestrator::new(coordinator);
    orch.register_agent(make_agent("alpha", "researcher", ScriptedModel::new(vec![])))
        .unwrap();
    orch.register_agent(make_agent("beta", "writer", FixedModel::new("beta result")))
        .unwrap();

    let result = orch.run_task("big task", Strategy::Parallel).await;

    assert_eq!(result.status, OrchestrationStatus::Completed);
    assert_eq!(result.individual_results.len(), 2);

    let alpha = result.individual_results.iter().find(|r| r.agent == "alpha").unwrap();
    let beta = result.individual_results.iter().find(|r| r.agent == "beta").unwrap();
    assert!(!alpha.success);
    assert!(beta.success);
    assert_eq!(beta.output, "beta result");
}

#[tokio::test]
async fn hierarchical_manager_plans_and_synthesizes() {
    let plan = r#"[
        {"agent": "alpha",   "subtask": "gather facts"},
        {"agent": "nobody",  "subtask": "skipped"},
        {"agent": "beta",    "subtask": "draft text"}
    ]"#;
    // first respond() emits the plan, second the synthesis
    let manager_model = ScriptedModel::texts(&[plan, "final report"]);

    let mut orch = Orchestrator::new(FixedModel::new("unused coordinator"));
    orch.register_agent(make_agent("boss", "manager", manager_model)).unwrap();
    orch.register_agent(make_agent("alpha", "researcher", FixedModel::new("facts")))
        .unwrap();
    orch.register_agent(make_agent("beta", "writer", FixedModel::new("draft")))
        .unwrap();

    let result = orch
        .run_task(
            "produce a report",
            Strategy::Hierarchical {
                manager: "boss".to_string(),
            },
        )
        .await;

    assert_eq!(result.status, OrchestrationStatus::Completed);
    assert_eq!(result.synthesis.as_deref(), Some("final report"));
    assert_eq!(result.individual_results.len(), 2);
    assert_eq!(result.individual_results[0].agent, "alpha");
    assert_eq!(result.individual_results[1].output, "draft");

    // delegation and reporting both flow through the bus
    let history = orch.bus().history();
    assert!(history
        .iter()
        .any(|m| m.sender == "boss" && m.receiver.as_deref() == Some("alpha")));
    assert!(history
        .iter()
        .any(|m| m.sender == "beta" && m.receiver.as_deref() == Some("boss")));
}

#[tokio::test]
async fn hierarchical_unknown_manager_fails() {
    let mut orch = Orchestrator::new(FixedModel::new("unused coordinator"));
    orch.register_agent(make_agent("alpha", "researcher", FixedModel::new("facts")))
        .unwrap();

    let result = orch
        .run_task(
            "task",
            Strategy::Hierarchical {
                manager: "nobody".to_string(),
            },
        )
        .await;

    assert_eq!(result.status, OrchestrationStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("Unknown agent"));
}

#[tokio::test]
async fn debate_runs_exactly_the_configured_rounds() {
    let mut orch = Orchestrator::new(FixedModel::new("unused coordinator"));
    orch.register_agent(make_agent("pro", "proponent", FixedModel::new("in favor")))
        .unwrap();
    orch.register_agent(make_agent("con", "opponent", FixedModel::new("against")))
        .unwrap();
    orch.register_agent(make_agent("judge", "judge", FixedModel::new("the proponent wins")))
        .unwrap();

    let result = orch
        .run_task("should we rewrite it", Strategy::Debate { max_rounds: 2 })
        .await;

    assert_eq!(result.status, OrchestrationStatus::Completed);

    // opening + 2 rebuttals per side, no early exit
    let pro_entries = result.individual_results.iter().filter(|r| r.agent == "pro").count();
    let con_entries = result.individual_results.iter().filter(|r| r.agent == "con").count();
    assert_eq!(pro_entries, 3);
    assert_eq!(con_entries, 3);
    assert_eq!(result.individual_results.len(), 6);

    // the judge speaks only through the synthesis
    assert!(result.individual_results.iter().all(|r| r.agent != "judge"));
    assert_eq!(result.synthesis.as_deref(), Some("the proponent wins"));

    // debate turns are broadcast for observability
    let broadcasts = orch
        .bus()
        .history()
        .iter()
        .filter(|m| m.kind == MessageKind::Broadcast)
        .count();
    assert_eq!(broadcasts, 7);
}

#[tokio::test]
async fn conversational_stops_on_termination_phrase() {
    let alice = ScriptedModel::texts(&["I propose plan A", "then we have CONSENSUS on plan A"]);
    let bob = ScriptedModel::texts(&["plan A seems fine to me"]);

    let mut orch = Orchestrator::new(FixedModel::new("unused coordinator"));
    orch.register_agent(make_agent("alice", "planner", alice)).unwrap();
    orch.register_agent(make_agent("bob", "reviewer", bob)).unwrap();

    let result = orch
        .run_task(
            "agree on a plan",
            Strategy::Conversational {
                max_turns: 10,
                termination_phrase: "CONSENSUS".to_string(),
            },
        )
        .await;

    assert_eq!(result.status, OrchestrationStatus::Completed);
    assert_eq!(result.turns, 3);
    assert_eq!(result.individual_results.len(), 3);
    assert!(result.synthesis.as_deref().unwrap().contains("CONSENSUS"));
}

#[tokio::test]
async fn conversational_hits_the_turn_cap() {
    let mut orch = Orchestrator::new(FixedModel::new("unused coordinator"));
    orch.register_agent(make_agent("alice", "planner", FixedModel::new("more discussion")))
        .unwrap();
    orch.register_agent(make_agent("bob", "reviewer", FixedModel::new("still unsure")))
        .unwrap();

    let result = orch
        .run_task(
            "agree on a plan",
            Strategy::Conversational {
                max_turns: 4,
                termination_phrase: "CONSENSUS".to_string(),
            },
        )
        .await;

    assert_eq!(result.status, OrchestrationStatus::MaxTurnsReached);
    assert_eq!(result.turns, 4);
    assert!(result.is_success());
}
