//! Multi-agent orchestration strategies
//!
//! An orchestrator owns a roster of agents, a coordinator model for
//! decomposition/synthesis, and a message bus on which inter-agent
//! handoffs are published. Five strategies share one result shape;
//! expected failures (malformed plans, failed agent runs) surface as
//! statuses, never as panics or propagated errors.

pub mod plan;

pub use plan::{Assignment, Plan};

use crate::agent::AgentCore;
use crate::bus::{BusMessage, MessageBus};
use crate::errors::{AgentError, Result};
use crate::models::ChatModel;
use crate::types::{ChatMessage, ModelTurn};
use plan::decomposition_prompt;
use std::collections::HashMap;
use std::sync::Arc;

/// Sender name used for handoffs originating from the orchestrator itself
const ORCHESTRATOR_ID: &str = "orchestrator";

/// How a task is distributed across the roster
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Registration order; each output feeds the next agent verbatim
    Sequential,
    /// Coordinator-planned fan-out with best-effort join
    Parallel,
    /// A manager agent plans, delegates, and synthesizes
    Hierarchical { manager: String },
    /// Proponent/opponent openings plus a fixed number of rebuttal
    /// rounds, judged by a third agent
    Debate { max_rounds: usize },
    /// Round-robin dialogue until a termination phrase or the turn cap
    Conversational {
        max_turns: usize,
        termination_phrase: String,
    },
}

/// Terminal status of an orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationStatus {
    Completed,
    /// Conversational run ended by the turn cap, not the phrase
    MaxTurnsReached,
    /// The coordinator or manager produced an unparseable plan
    PlanFailed,
    Failed,
}

/// One agent's contribution to an orchestration run
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub agent: String,
    pub output: String,
    pub success: bool,
}

/// Uniform result shape across all strategies
#[derive(Debug, Clone)]
pub struct OrchestrationResult {
    pub individual_results: Vec<AgentOutput>,
    pub synthesis: Option<String>,
    pub status: OrchestrationStatus,
    pub turns: usize,
    pub error: Option<String>,
}

impl OrchestrationResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            individual_results: Vec::new(),
            synthesis: None,
            status: OrchestrationStatus::Failed,
            turns: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            OrchestrationStatus::Completed | OrchestrationStatus::MaxTurnsReached
        )
    }
}

/// Runs tasks across a registered roster of agents
pub struct Orchestrator {
    agents: Vec<Arc<AgentCore>>,
    index: HashMap<String, usize>,
    coordinator: Arc<dyn ChatModel>,
    bus: Arc<MessageBus>,
    verbose: bool,
}

impl Orchestrator {
    pub fn new(coordinator: Arc<dyn ChatModel>) -> Self {
        Self::with_bus(coordinator, Arc::new(MessageBus::new()), false)
    }

    pub fn with_bus(
        coordinator: Arc<dyn ChatModel>,
        bus: Arc<MessageBus>,
        verbose: bool,
    ) -> Self {
        Self {
            agents: Vec::new(),
            index: HashMap::new(),
            coordinator,
            bus,
            verbose,
        }
    }

    /// Add an agent to the roster; names must be unique
    pub fn register_agent(&mut self, agent: Arc<AgentCore>) -> Result<()> {
        let name = agent.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::Config(format!(
                "agent '{}' is already registered",
                name
            )));
        }
        self.index.insert(name, self.agents.len());
        self.agents.push(agent);
        Ok(())
    }

    pub fn agent(&self, name: &str) -> Option<&Arc<AgentCore>> {
        self.index.get(name).map(|&i| &self.agents[i])
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Run a task under the given strategy
    ///
    /// Never raises: plan-parse failures map to `PlanFailed`, everything
    /// else unexpected to `Failed`, both carrying the error text.
    pub async fn run_task(&self, task: &str, strategy: Strategy) -> OrchestrationResult {
        if self.agents.is_empty() {
            return OrchestrationResult::failed("no agents registered");
        }

        let outcome = match strategy {
            Strategy::Sequential => self.run_sequential(task).await,
            Strategy::Parallel => self.run_parallel(task).await,
            Strategy::Hierarchical { manager } => self.run_hierarchical(task, &manager).await,
            Strategy::Debate { max_rounds } => self.run_debate(task, max_rounds).await,
            Strategy::Conversational {
                max_turns,
                termination_phrase,
            } => self.run_conversational(task, max_turns, &termination_phrase).await,
        };

        match outcome {
            Ok(result) => result,
            Err(AgentError::PlanParse(msg)) => OrchestrationResult {
                individual_results: Vec::new(),
                synthesis: None,
                status: OrchestrationStatus::PlanFailed,
                turns: 0,
                error: Some(msg),
            },
            Err(e) => OrchestrationResult::failed(e.to_string()),
        }
    }

    /// Pipeline: output i is input i+1, verbatim
    async fn run_sequential(&self, task: &str) -> Result<OrchestrationResult> {
        let mut current = task.to_string();
        let mut results = Vec::with_capacity(self.agents.len());

        for (i, agent) in self.agents.iter().enumerate() {
            let sender = if i == 0 {
                ORCHESTRATOR_ID.to_string()
            } else {
                self.agents[i - 1].name().to_string()
            };
            self.bus
                .send(BusMessage::direct(sender, agent.name(), current.clone()))?;

            let report = agent.run(&current).await;
            if !report.is_success() {
                let error = report.error.unwrap_or_else(|| "agent run failed".to_string());
                results.push(AgentOutput {
                    agent: agent.name().to_string(),
                    output: error.clone(),
                    success: false,
                });
                return Ok(OrchestrationResult {
                    individual_results: results,
                    synthesis: None,
                    status: OrchestrationStatus::Failed,
                    turns: i + 1,
                    error: Some(error),
                });
            }

            let output = report.output.unwrap_or_default();
            results.push(AgentOutput {
                agent: agent.name().to_string(),
                output: output.clone(),
                success: true,
            });
            current = output;
        }

        Ok(OrchestrationResult {
            turns: results.len(),
            individual_results: results,
            synthesis: Some(current),
            status: OrchestrationStatus::Completed,
            error: None,
        })
    }

    /// Coordinator plan, spawned fan-out, best-effort join, synthesis
    async fn run_parallel(&self, task: &str) -> Result<OrchestrationResult> {
        let plan_text = self
            .coordinator_text(&decomposition_prompt(task, &self.roster(None)))
            .await?;
        let plan = Plan::parse(&plan_text)?;

        let mut handles = Vec::new();
        for assignment in plan.assignments {
            let Some(&idx) = self.index.get(&assignment.agent) else {
                if self.verbose {
                    eprintln!("[PLAN] skipping unknown agent '{}'", assignment.agent);
                }
                continue;
            };
            let agent = Arc::clone(&self.agents[idx]);
            self.bus.send(BusMessage::direct(
                ORCHESTRATOR_ID,
                agent.name(),
                assignment.subtask.clone(),
            ))?;

            handles.push(tokio::spawn(async move {
                let report = agent.run(&assignment.subtask).await;
                (agent.name().to_string(), report)
            }));
        }
        if handles.is_empty() {
            return Err(AgentError::PlanParse(
                "plan names no registered agents".to_string(),
            ));
        }

        // A failed or panicked branch does not cancel its siblings.
        let mut results = Vec::with_capacity(handles.len());
        for joined in futures_util::future::join_all(handles).await {
            match joined {
                Ok((agent, report)) => {
                    let success = report.is_success();
                    let output = if success {
                        report.output.unwrap_or_default()
                    } else {
                        report.error.unwrap_or_else(|| "agent run failed".to_string())
                    };
                    results.push(AgentOutput {
                        agent,
                        output,
                        success,
                    });
                }
                Err(e) => results.push(AgentOutput {
                    agent: "<panicked>".to_string(),
                    output: e.to_string(),
                    success: false,
                }),
            }
        }
        results.sort_by(|a, b| a.agent.cmp(&b.agent));

        let synthesis = self.synthesize(task, &results).await?;

        Ok(OrchestrationResult {
            turns: results.len(),
            individual_results: results,
            synthesis: Some(synthesis),
            status: OrchestrationStatus::Completed,
            error: None,
        })
    }

    /// Manager plans, workers execute in plan order, manager synthesizes
    async fn run_hierarchical(&self, task: &str, manager: &str) -> Result<OrchestrationResult> {
        let manager = self
            .agent(manager)
            .ok_or_else(|| AgentError::UnknownAgent(manager.to_string()))?;

        let plan_text = manager
            .respond(&decomposition_prompt(task, &self.roster(Some(manager.name()))))
            .await?;
        let plan = Plan::parse(&plan_text)?;

        let mut results = Vec::new();
        for assignment in plan.assignments {
            let worker = match self.agent(&assignment.agent) {
                Some(w) if w.name() != manager.name() => w,
                _ => {
                    if self.verbose {
                        eprintln!("[PLAN] skipping unknown worker '{}'", assignment.agent);
                    }
                    continue;
                }
            };

            self.bus.send(BusMessage::direct(
                manager.name(),
                worker.name(),
                assignment.subtask.clone(),
            ))?;

            let report = worker.run(&assignment.subtask).await;
            let success = report.is_success();
            let output = if success {
                report.output.unwrap_or_default()
            } else {
                report.error.unwrap_or_else(|| "agent run failed".to_string())
            };
            self.bus
                .send(BusMessage::direct(worker.name(), manager.name(), output.clone()))?;

            results.push(AgentOutput {
                agent: worker.name().to_string(),
                output,
                success,
            });
        }
        if results.is_empty() {
            return Err(AgentError::PlanParse(
                "plan names no registered workers".to_string(),
            ));
        }

        let reports = results
            .iter()
            .map(|r| format!("{} ({}): {}", r.agent, if r.success { "ok" } else { "failed" }, r.output))
            .collect::<Vec<_>>()
            .join("\n");
        let synthesis = manager
            .respond(&format!(
                "Your workers reported the following results:\n{}\n\n\
                 Synthesize a final answer for the task: {}",
                reports, task
            ))
            .await?;

        Ok(OrchestrationResult {
            turns: results.len(),
            individual_results: results,
            synthesis: Some(synthesis),
            status: OrchestrationStatus::Completed,
            error: None,
        })
    }

    /// Openings plus exactly `max_rounds` rebuttal rounds, then a verdict
    ///
    /// Roster order assigns the seats: proponent, opponent, judge. There
    /// is no convergence early-exit; the judge's verdict is the synthesis
    /// and does not appear among the individual results.
    async fn run_debate(&self, task: &str, max_rounds: usize) -> Result<OrchestrationResult> {
        if self.agents.len() < 3 {
            return Err(AgentError::Config(
                "debate requires a proponent, an opponent, and a judge".to_string(),
            ));
        }
        let proponent = &self.agents[0];
        let opponent = &self.agents[1];
        let judge = &self.agents[2];

        let mut results = Vec::with_capacity(2 * (max_rounds + 1));
        let mut dialogue = format!("Debate topic: {}\n", task);

        let text = proponent
            .respond(&format!(
                "{}\nPresent your opening argument in favor.",
                dialogue
            ))
            .await?;
        self.record_statement(&mut results, &mut dialogue, proponent.name(), text)?;

        let text = opponent
            .respond(&format!(
                "{}\nPresent your opening argument against.",
                dialogue
            ))
            .await?;
        self.record_statement(&mut results, &mut dialogue, opponent.name(), text)?;

        for round in 1..=max_rounds {
            let text = proponent
                .respond(&format!(
                    "{}\nRebuttal round {}: respond to the opposing side.",
                    dialogue, round
                ))
                .await?;
            self.record_statement(&mut results, &mut dialogue, proponent.name(), text)?;

            let text = opponent
                .respond(&format!(
                    "{}\nRebuttal round {}: respond to the opposing side.",
                    dialogue, round
                ))
                .await?;
            self.record_statement(&mut results, &mut dialogue, opponent.name(), text)?;
        }

        let verdict = judge
            .respond(&format!(
                "{}\nAs the judge, weigh both sides and render a verdict.",
                dialogue
            ))
            .await?;
        self.bus
            .send(BusMessage::broadcast(judge.name(), verdict.clone()))?;

        Ok(OrchestrationResult {
            individual_results: results,
            synthesis: Some(verdict),
            status: OrchestrationStatus::Completed,
            turns: max_rounds + 1,
            error: None,
        })
    }

    /// Round-robin turns until the termination phrase or the turn cap
    async fn run_conversational(
        &self,
        task: &str,
        max_turns: usize,
        termination_phrase: &str,
    ) -> Result<OrchestrationResult> {
        let mut dialogue = format!("Topic: {}\n", task);
        let mut results = Vec::new();
        let mut turns = 0;

        while turns < max_turns {
            let agent = &self.agents[turns % self.agents.len()];
            turns += 1;

            let text = agent
                .respond(&format!("{}\nIt is your turn to speak. Respond briefly.", dialogue))
                .await?;
            self.bus
                .send(BusMessage::broadcast(agent.name(), text.clone()))?;
            dialogue.push_str(&format!("{}: {}\n", agent.name(), text));
            results.push(AgentOutput {
                agent: agent.name().to_string(),
                output: text.clone(),
                success: true,
            });

            if text.contains(termination_phrase) {
                return Ok(OrchestrationResult {
                    individual_results: results,
                    synthesis: Some(text),
                    status: OrchestrationStatus::Completed,
                    turns,
                    error: None,
                });
            }
        }

        let synthesis = results.last().map(|r| r.output.clone());
        Ok(OrchestrationResult {
            individual_results: results,
            synthesis,
            status: OrchestrationStatus::MaxTurnsReached,
            turns,
            error: None,
        })
    }

    fn record_statement(
        &self,
        results: &mut Vec<AgentOutput>,
        dialogue: &mut String,
        agent: &str,
        text: String,
    ) -> Result<()> {
        self.bus.send(BusMessage::broadcast(agent, text.clone()))?;
        dialogue.push_str(&format!("{}: {}\n", agent, text));
        results.push(AgentOutput {
            agent: agent.to_string(),
            output: text,
            success: true,
        });
        Ok(())
    }

    fn roster(&self, exclude: Option<&str>) -> Vec<(String, String)> {
        self.agents
            .iter()
            .filter(|a| Some(a.name()) != exclude)
            .map(|a| (a.name().to_string(), a.definition().role.clone()))
            .collect()
    }

    async fn coordinator_text(&self, prompt: &str) -> Result<String> {
        match self
            .coordinator
            .chat(&[ChatMessage::user(prompt)], &[])
            .await?
        {
            ModelTurn::Text(text) => Ok(text),
            ModelTurn::ToolCalls(_) => Err(AgentError::ModelApi(
                "coordinator returned tool calls instead of a plan".to_string(),
            )),
        }
    }

    async fn synthesize(&self, task: &str, results: &[AgentOutput]) -> Result<String> {
        let reports = results
            .iter()
            .map(|r| format!("{} ({}): {}", r.agent, if r.success { "ok" } else { "failed" }, r.output))
            .collect::<Vec<_>>()
            .join("\n");
        self.coordinator_text(&format!(
            "Agents produced the following results:\n{}\n\n\
             Combine them into a single final answer for the task: {}",
            reports, task
        ))
        .await
    }
}
