//! Single-agent bounded execution loop
//!
//! Drives one model-backed agent through plan -> execute -> (reflect) ->
//! complete/fail. The loop is bounded by an iteration budget and a
//! run-level wall-clock timeout; tool results, success or failure, are
//! appended to the transcript as input to the next reasoning step.

use crate::agent::state::{AgentState, StateEvent};
use crate::errors::{AgentError, Result};
use crate::memory::{MemoryRecord, MemoryStore};
use crate::models::ChatModel;
use crate::tools::ToolRegistry;
use crate::types::{
    ChatMessage, IterationRecord, ModelTurn, Role, RunReport, RunStatus, ToolCallRequest,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Immutable agent identity: name, role, system directive, model handle
pub struct AgentDefinition {
    pub name: String,
    pub role: String,
    pub directive: String,
    pub model: Arc<dyn ChatModel>,
}

impl AgentDefinition {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        directive: impl Into<String>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            directive: directive.into(),
            model,
        }
    }
}

/// Loop bounds and policy switches
#[derive(Debug, Clone)]
pub struct AgentCoreConfig {
    /// Hard cap on loop iterations
    pub max_iterations: usize,

    /// Hard cap on wall-clock run duration
    pub timeout: Duration,

    /// Tool calls executed per iteration; excess requests are deferred
    pub max_tool_calls_per_iteration: usize,

    /// Run a self-evaluation step after each text answer
    pub reflection_enabled: bool,

    /// Whether a Reflecting -> Executing cycle consumes an iteration
    pub reflection_counts_iteration: bool,

    /// Memory entries recalled into the context at planning time
    pub recall_k: usize,

    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for AgentCoreConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            timeout: Duration::from_secs(120),
            max_tool_calls_per_iteration: 4,
            reflection_enabled: false,
            reflection_counts_iteration: true,
            recall_k: 4,
            verbose: false,
        }
    }
}

/// Mutable per-run state, owned exclusively by one `run` call
struct AgentRuntimeState {
    state: AgentState,
    transcript: Vec<ChatMessage>,
    iterations: usize,
}

/// The single-agent execution engine
pub struct AgentCore {
    definition: AgentDefinition,
    tools: ToolRegistry,
    memory: Mutex<MemoryStore>,
    config: AgentCoreConfig,
}

impl AgentCore {
    pub fn new(
        definition: AgentDefinition,
        tools: ToolRegistry,
        memory: MemoryStore,
        config: AgentCoreConfig,
    ) -> Self {
        Self {
            definition,
            tools,
            memory: Mutex::new(memory),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &AgentCoreConfig {
        &self.config
    }

    /// Store a memory entry for later recall
    pub async fn remember(&self, content: &str, metadata: HashMap<String, String>) -> Result<()> {
        self.memory.lock().await.add(content, metadata).await
    }

    /// Recall entries similar to the query
    pub async fn recall(&self, query: &str, k: usize) -> Result<Vec<MemoryRecord>> {
        self.memory.lock().await.recall(query, k).await
    }

    /// Verbatim tail of recent short-term memory
    pub async fn summarize_recent(&self) -> String {
        self.memory.lock().await.summarize_recent()
    }

    /// Drive the bounded loop for a goal
    ///
    /// Always returns a report: timeouts and unexpected model failures
    /// yield `Failed` with the partial execution log. Tool invocations
    /// already issued are not rolled back (at-least-once side effects).
    pub async fn run(&self, goal: &str) -> RunReport {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let started = Instant::now();

        let outcome = tokio::time::timeout(
            self.config.timeout,
            self.run_inner(goal, Arc::clone(&log)),
        )
        .await;

        let execution_log: Vec<IterationRecord> = log.lock().unwrap().clone();
        let duration_ms = started.elapsed().as_millis() as u64;
        let logged_iterations = execution_log.iter().map(|r| r.iteration).max().unwrap_or(0);

        match outcome {
            Ok(Ok((status, output, iterations))) => RunReport {
                status,
                output: Some(output),
                error: None,
                execution_log,
                iterations,
                duration_ms,
            },
            Ok(Err(e)) => {
                if self.config.verbose {
                    eprintln!("[RUN] {} failed: {}", self.definition.name, e);
                }
                RunReport {
                    status: RunStatus::Failed,
                    output: None,
                    error: Some(e.to_string()),
                    execution_log,
                    iterations: logged_iterations,
                    duration_ms,
                }
            }
            Err(_) => RunReport {
                status: RunStatus::Failed,
                output: None,
                error: Some(AgentError::Timeout { duration_ms }.to_string()),
                execution_log,
                iterations: logged_iterations,
                duration_ms,
            },
        }
    }

    /// Single-shot model call with the agent's directive, no tool loop
    ///
    /// Used for orchestration turns (debate rebuttals, conversation turns,
    /// manager planning) that do not need the full execution loop.
    pub async fn respond(&self, prompt: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(self.system_preamble()),
            ChatMessage::user(prompt),
        ];
        match self.definition.model.chat(&messages, &[]).await? {
            ModelTurn::Text(text) => Ok(text),
            ModelTurn::ToolCalls(_) => Err(AgentError::ModelApi(
                "expected a text response, got tool calls".to_string(),
            )),
        }
    }

    fn system_preamble(&self) -> String {
        format!(
            "You are {} ({}). {}",
            self.definition.name, self.definition.role, self.definition.directive
        )
    }

    fn advance(&self, rt: &mut AgentRuntimeState, event: StateEvent) -> Result<()> {
        let next = rt.state.transition(event)?;
        if self.config.verbose {
            eprintln!(
                "[STATE] {} {:?} -> {:?}",
                self.definition.name, rt.state, next
            );
        }
        rt.state = next;
        Ok(())
    }

    async fn run_inner(
        &self,
        goal: &str,
        log: Arc<StdMutex<Vec<IterationRecord>>>,
    ) -> Result<(RunStatus, String, usize)> {
        let mut rt = AgentRuntimeState {
            state: AgentState::Idle,
            transcript: Vec::new(),
            iterations: 0,
        };

        self.advance(&mut rt, StateEvent::GoalSubmitted)?;

        // Context assembly: directive + recalled memory + goal
        rt.transcript.push(ChatMessage::system(self.system_preamble()));

        let recalled = {
            let memory = self.memory.lock().await;
            match memory.recall(goal, self.config.recall_k).await {
                Ok(records) => records,
                Err(e) => {
                    if self.config.verbose {
                        eprintln!("[MEMORY] {} recall failed: {}", self.definition.name, e);
                    }
                    Vec::new()
                }
            }
        };
        if !recalled.is_empty() {
            let lines = recalled
                .iter()
                .map(|r| format!("- {}", r.content))
                .collect::<Vec<_>>()
                .join("\n");
            rt.transcript
                .push(ChatMessage::system(format!("Relevant memory:\n{}", lines)));
        }
        rt.transcript.push(ChatMessage::user(goal));

        self.advance(&mut rt, StateEvent::ContextAssembled)?;

        let schemas = self.tools.schemas();
        let mut pending: VecDeque<ToolCallRequest> = VecDeque::new();

        loop {
            if rt.iterations >= self.config.max_iterations {
                self.advance(&mut rt, StateEvent::BudgetExhausted)?;
                let output = last_assistant_text(&rt.transcript).unwrap_or_default();
                return Ok((RunStatus::CompletedPartial, output, rt.iterations));
            }
            rt.iterations += 1;
            let mut record = IterationRecord::new(rt.iterations, rt.state.display_name());

            if pending.is_empty() {
                let turn = self.definition.model.chat(&rt.transcript, &schemas).await?;
                match turn {
                    ModelTurn::Text(text) => {
                        record.model_output = Some(text.clone());
                        rt.transcript.push(ChatMessage::assistant(text.clone()));

                        if !self.config.reflection_enabled {
                            self.advance(&mut rt, StateEvent::FinalAnswer)?;
                            let iterations = rt.iterations;
                            log.lock().unwrap().push(record);
                            self.remember_outcome(goal, &text).await;
                            return Ok((RunStatus::Completed, text, iterations));
                        }

                        self.advance(&mut rt, StateEvent::NeedsReflection)?;
                        let goal_met = self.reflect(&rt.transcript).await?;
                        record.note = Some(
                            if goal_met {
                                "reflection: goal met"
                            } else {
                                "reflection: goal unmet"
                            }
                            .to_string(),
                        );

                        if goal_met {
                            self.advance(&mut rt, StateEvent::GoalMet)?;
                            let iterations = rt.iterations;
                            log.lock().unwrap().push(record);
                            self.remember_outcome(goal, &text).await;
                            return Ok((RunStatus::Completed, text, iterations));
                        }

                        self.advance(&mut rt, StateEvent::GoalUnmet)?;
                        rt.transcript.push(ChatMessage::user(
                            "The goal is not yet satisfied. Continue working toward it.",
                        ));
                        if !self.config.reflection_counts_iteration {
                            rt.iterations -= 1;
                        }
                        log.lock().unwrap().push(record);
                        continue;
                    }
                    ModelTurn::ToolCalls(calls) => {
                        let rendered = calls
                            .iter()
                            .map(|c| format!("TOOL_CALL: {} {}", c.tool, c.args))
                            .collect::<Vec<_>>()
                            .join("\n");
                        rt.transcript.push(ChatMessage::assistant(rendered));
                        record.tool_calls = calls.clone();
                        pending.extend(calls);
                    }
                }
            }

            // Execute up to the per-iteration bound; excess stays queued
            // for the next iteration.
            let mut executed = 0;
            while executed < self.config.max_tool_calls_per_iteration {
                let Some(call) = pending.pop_front() else { break };
                let result = self.tools.invoke(&call.tool, &call.args).await;
                if self.config.verbose {
                    eprintln!(
                        "[TOOL] {} {} success={}",
                        self.definition.name, call.tool, result.success
                    );
                }
                rt.transcript.push(ChatMessage::tool(result.transcript_line()));
                record.tool_results.push(result);
                executed += 1;
            }
            if !pending.is_empty() {
                record.note = Some(format!(
                    "{} tool calls deferred to the next iteration",
                    pending.len()
                ));
            }

            self.advance(&mut rt, StateEvent::ToolRoundComplete)?;
            log.lock().unwrap().push(record);
        }
    }

    /// Post-answer self-evaluation: has the stated goal been satisfied?
    async fn reflect(&self, transcript: &[ChatMessage]) -> Result<bool> {
        let mut messages = transcript.to_vec();
        messages.push(ChatMessage::user(
            "Review the conversation. Has the stated goal been fully satisfied? \
             Answer with GOAL_MET or GOAL_NOT_MET and a one-line justification.",
        ));
        match self.definition.model.chat(&messages, &[]).await? {
            ModelTurn::Text(text) => {
                Ok(text.contains("GOAL_MET") && !text.contains("GOAL_NOT_MET"))
            }
            ModelTurn::ToolCalls(_) => Ok(false),
        }
    }

    /// Store the completed goal/outcome pair for future recall
    async fn remember_outcome(&self, goal: &str, output: &str) {
        let mut metadata = HashMap::new();
        metadata.insert("kind".to_string(), "run_outcome".to_string());
        metadata.insert("agent".to_string(), self.definition.name.clone());

        let content = format!("Goal: {}\nOutcome: {}", goal, output);
        let mut memory = self.memory.lock().await;
        if let Err(e) = memory.add(&content, metadata).await {
            if self.config.verbose {
                eprintln!(
                    "[MEMORY] {} failed to store run outcome: {}",
                    self.definition.name, e
                );
            }
        }
    }
}

fn last_assistant_text(transcript: &[ChatMessage]) -> Option<String> {
    transcript
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.clone())
}
