use std::collections::HashMap;
use std::time::Instant;

/// A single accounted oracle call, retained for post-hoc reporting.
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub kind: String,
    pub tokens: u32,
    pub success: bool,
    pub pattern: Option<String>,
}

/// Process-wide oracle call accounting: total/per-kind counters, tokens, successes,
/// and history. Caps are enforced before dispatching any request.
#[derive(Debug)]
pub struct CallBudget {
    max_total: u32,
    per_kind_caps: HashMap<String, u32>,
    counts: HashMap<String, u32>,
    total_calls: u32,
    total_tokens: u64,
    history: Vec<CallRecord>,
    started_at: Instant,
}

impl CallBudget {
    pub fn new(max_total: u32, per_kind_caps: HashMap<String, u32>) -> Self {
        CallBudget {
            max_total,
            per_kind_caps,
            counts: HashMap::new(),
            total_calls: 0,
            total_tokens: 0,
            history: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// A budget that refuses every call outright (`max_total = 0`).
    pub fn closed() -> Self {
        CallBudget::new(0, HashMap::new())
    }

    pub fn max_total(&self) -> u32 {
        self.max_total
    }

    pub fn total_calls(&self) -> u32 {
        self.total_calls
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn history(&self) -> &[CallRecord] {
        &self.history
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// True iff (total calls < total cap) AND (per-kind calls < per-kind cap).
    pub fn can_call(&self, kind: &str) -> bool {
        if self.total_calls >= self.max_total {
            return false;
        }
        let kind_cap = self.per_kind_caps.get(kind).copied().unwrap_or(self.max_total);
        self.counts.get(kind).copied().unwrap_or(0) < kind_cap
    }

    pub fn is_exhausted(&self) -> bool {
        self.total_calls >= self.max_total
    }

    pub fn record(&mut self, kind: &str, tokens: u32, success: bool, pattern: Option<String>) {
        *self.counts.entry(kind.to_string()).or_insert(0) += 1;
        self.total_calls += 1;
        self.total_tokens += tokens as u64;
        self.history.push(CallRecord {
            kind: kind.to_string(),
            tokens,
            success,
            pattern,
        });
    }

    pub fn remaining(&self, kind: Option<&str>) -> u32 {
        let total_remaining = self.max_total.saturating_sub(self.total_calls);
        match kind {
            None => total_remaining,
            Some(kind) => {
                let kind_cap = self.per_kind_caps.get(kind).copied().unwrap_or(self.max_total);
                let kind_remaining = kind_cap.saturating_sub(self.counts.get(kind).copied().unwrap_or(0));
                kind_remaining.min(total_remaining)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_budget_refuses_everything() {
        let budget = CallBudget::closed();
        assert!(!budget.can_call("pattern_match"));
    }

    #[test]
    fn total_cap_enforced() {
        let mut budget = CallBudget::new(1, HashMap::new());
        assert!(budget.can_call("pattern_match"));
        budget.record("pattern_match", 10, true, Some("A.P.E".to_string()));
        assert!(!budget.can_call("pattern_match"));
    }

    #[test]
    fn per_kind_cap_enforced_independently_of_total() {
        let mut caps = HashMap::new();
        caps.insert("themed_list".to_string(), 1);
        let mut budget = CallBudget::new(10, caps);
        budget.record("themed_list", 0, true, None);
        assert!(!budget.can_call("themed_list"));
        assert!(budget.can_call("pattern_match"));
    }

    #[test]
    fn remaining_accounts_for_both_caps() {
        let mut caps = HashMap::new();
        caps.insert("themed_list".to_string(), 3);
        let budget = CallBudget::new(2, caps);
        assert_eq!(2, budget.remaining(Some("themed_list")));
    }
}
