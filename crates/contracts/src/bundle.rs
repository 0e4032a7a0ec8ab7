use serde::{Deserialize, Serialize};

use crate::Resource;

/// Sparse resource amounts. Absent and zero mean the same thing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_seeds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pumpkins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apples: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_pies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<u32>,
}

impl ResourceBundle {
    pub fn get(&self, resource: Resource) -> u32 {
        self.slot(resource).unwrap_or(0)
    }

    pub fn with(mut self, resource: Resource, amount: u32) -> Self {
        *self.slot_mut(resource) = if amount == 0 { None } else { Some(amount) };
        self
    }

    /// Non-zero entries in `Resource::ALL` order.
    pub fn entries(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(|resource| (resource, self.get(resource)))
            .filter(|(_, amount)| *amount > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    fn slot(&self, resource: Resource) -> Option<u32> {
        match resource {
            Resource::Coins => self.coins,
            Resource::Seeds => self.seeds,
            Resource::AppleSeeds => self.apple_seeds,
            Resource::Pumpkins => self.pumpkins,
            Resource::Apples => self.apples,
            Resource::Pies => self.pies,
            Resource::ApplePies => self.apple_pies,
            Resource::Fertilizer => self.fertilizer,
            Resource::Tools => self.tools,
        }
    }

    fn slot_mut(&mut self, resource: Resource) -> &mut Option<u32> {
        match resource {
            Resource::Coins => &mut self.coins,
            Resource::Seeds => &mut self.seeds,
            Resource::AppleSeeds => &mut self.apple_seeds,
            Resource::Pumpkins => &mut self.pumpkins,
            Resource::Apples => &mut self.apples,
            Resource::Pies => &mut self.pies,
            Resource::ApplePies => &mut self.apple_pies,
            Resource::Fertilizer => &mut self.fertilizer,
            Resource::Tools => &mut self.tools,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRewards {
    pub coins: u32,
    pub experience: u64,
    #[serde(default, skip_serializing_if = "ResourceBundle::is_empty")]
    pub bonus: ResourceBundle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_skip_zero_and_absent_amounts() {
        let bundle = ResourceBundle::default()
            .with(Resource::Pies, 2)
            .with(Resource::Pumpkins, 0)
            .with(Resource::Coins, 10);

        let entries = bundle.entries().collect::<Vec<_>>();
        assert_eq!(entries, vec![(Resource::Coins, 10), (Resource::Pies, 2)]);
        assert_eq!(bundle.get(Resource::Pumpkins), 0);
        assert!(!bundle.is_empty());
        assert!(ResourceBundle::default().is_empty());
    }

    #[test]
    fn sparse_fields_are_omitted_on_the_wire() {
        let bundle = ResourceBundle::default().with(Resource::ApplePies, 1);
        let raw = serde_json::to_string(&bundle).expect("serialize");
        assert_eq!(raw, r#"{"applePies":1}"#);

        let parsed: ResourceBundle =
            serde_json::from_str(r#"{"pumpkins":3,"apples":2}"#).expect("deserialize");
        assert_eq!(parsed.get(Resource::Pumpkins), 3);
        assert_eq!(parsed.get(Resource::Apples), 2);
    }
}
