use crate::types::{AgentProfile, TransferPair};

/// Deterministic circular pairing of agents to accounts.
///
/// Agent *i* transfers from account *i* to account *(i+1) mod accounts*,
/// the dining-philosophers shape. Every adjacent pair of agents contends on
/// a shared account, and the cycle closes, so lock-order conflict is
/// guaranteed rather than probable.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadTopology {
    agents: u32,
    accounts: u32,
}

/// One agent's place in the workload: who it is and which transfer it runs.
#[derive(Debug, Clone)]
pub struct AgentAssignment {
    pub agent: AgentProfile,
    pub pair: TransferPair,
}

impl WorkloadTopology {
    pub fn circular(agents: u32, accounts: u32) -> Self {
        Self { agents, accounts }
    }

    /// Agent priorities equal their index, so agent 0 is the most senior.
    pub fn assignments(&self) -> Vec<AgentAssignment> {
        (0..self.agents)
            .map(|i| AgentAssignment {
                agent: AgentProfile::new(format!("agent_{}", i), i as u64),
                pair: TransferPair::new(i % self.accounts, (i + 1) % self.accounts),
            })
            .collect()
    }

    pub fn agent_count(&self) -> u32 {
        self.agents
    }
}
