use crate::fetcher::Identity;

/// Ordered pool of user agents. Each item starts at its own offset and
/// moves one slot per retry.
#[derive(Debug, Clone)]
pub struct UserAgentRotation {
    agents: Vec<String>,
}

impl UserAgentRotation {
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn random_offset(&self) -> usize {
        if self.agents.is_empty() {
            0
        } else {
            rand::random_range(0..self.agents.len())
        }
    }

    pub fn identity(&self, offset: usize, attempt: u32) -> Identity {
        let user_agent = if self.agents.is_empty() {
            String::new()
        } else {
            self.agents[(offset + attempt as usize) % self.agents.len()].clone()
        };
        Identity { user_agent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_attempts_use_different_agents() {
        let rotation = UserAgentRotation::new(vec!["a".into(), "b".into(), "c".into()]);

        let agents: Vec<String> = (0..4)
            .map(|attempt| rotation.identity(2, attempt).user_agent)
            .collect();

        assert_eq!(agents, vec!["c", "a", "b", "c"]);
    }

    #[test]
    fn offset_stays_in_range() {
        let rotation = UserAgentRotation::new(vec!["a".into(), "b".into()]);
        for _ in 0..20 {
            assert!(rotation.random_offset() < rotation.len());
        }
    }
}
