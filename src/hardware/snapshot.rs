use serde::{Serialize, Serializer};

use crate::hardware::types::{
    BlockInfo, Category, CpuInfo, GpuInfo, MemoryInfo, NetworkInfo, TopologyInfo,
};

/// One category's slot in a [`Snapshot`].
///
/// Disabled sections are left out of the document, failed ones serialize as
/// `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Section<T> {
    #[default]
    Disabled,
    Failed,
    Present(T),
}

impl<T> Section<T> {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Section::Disabled)
    }
}

impl<T: Serialize> Serialize for Section<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Section::Present(value) => serializer.serialize_some(value),
            Section::Failed | Section::Disabled => serializer.serialize_none(),
        }
    }
}

/// Per-category failure descriptions. Only failed categories have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorSet {
    #[serde(rename = "Memory", skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(rename = "CPU", skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(rename = "Block", skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(rename = "Topology", skip_serializing_if = "Option::is_none")]
    pub topology: Option<String>,
    #[serde(rename = "Network", skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(rename = "GPU", skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
}

impl ErrorSet {
    pub fn get(&self, category: Category) -> Option<&str> {
        self.slot(category).as_deref()
    }

    pub fn set(&mut self, category: Category, message: String) {
        *self.slot_mut(category) = Some(message);
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_none())
    }

    fn slot(&self, category: Category) -> &Option<String> {
        match category {
            Category::Memory => &self.memory,
            Category::Cpu => &self.cpu,
            Category::Block => &self.block,
            Category::Topology => &self.topology,
            Category::Network => &self.network,
            Category::Gpu => &self.gpu,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<String> {
        match category {
            Category::Memory => &mut self.memory,
            Category::Cpu => &mut self.cpu,
            Category::Block => &mut self.block,
            Category::Topology => &mut self.topology,
            Category::Network => &mut self.network,
            Category::Gpu => &mut self.gpu,
        }
    }
}

/// Everything one invocation learned about the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(rename = "Memory", skip_serializing_if = "Section::is_disabled")]
    pub memory: Section<MemoryInfo>,
    #[serde(rename = "CPU", skip_serializing_if = "Section::is_disabled")]
    pub cpu: Section<CpuInfo>,
    #[serde(rename = "Block", skip_serializing_if = "Section::is_disabled")]
    pub block: Section<BlockInfo>,
    #[serde(rename = "Topology", skip_serializing_if = "Section::is_disabled")]
    pub topology: Section<TopologyInfo>,
    #[serde(rename = "Network", skip_serializing_if = "Section::is_disabled")]
    pub network: Section<NetworkInfo>,
    #[serde(rename = "GPU", skip_serializing_if = "Section::is_disabled")]
    pub gpu: Section<GpuInfo>,
    #[serde(rename = "Errors")]
    pub errors: ErrorSet,
}

impl Snapshot {
    pub fn is_failed(&self, category: Category) -> bool {
        match category {
            Category::Memory => matches!(self.memory, Section::Failed),
            Category::Cpu => matches!(self.cpu, Section::Failed),
            Category::Block => matches!(self.block, Section::Failed),
            Category::Topology => matches!(self.topology, Section::Failed),
            Category::Network => matches!(self.network, Section::Failed),
            Category::Gpu => matches!(self.gpu, Section::Failed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sections_serialize_by_state() {
        let snapshot = Snapshot {
            memory: Section::Present(MemoryInfo {
                total_bytes: 1024,
                ..Default::default()
            }),
            cpu: Section::Failed,
            ..Default::default()
        };

        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["Memory"]["TotalBytes"], json!(1024));
        assert_eq!(value["CPU"], json!(null));
        assert!(value.get("Block").is_none());
        assert!(value.get("GPU").is_none());
        assert_eq!(value["Errors"], json!({}));
    }

    #[test]
    fn key_order_follows_declaration() {
        let snapshot = Snapshot {
            memory: Section::Failed,
            cpu: Section::Failed,
            block: Section::Failed,
            topology: Section::Failed,
            network: Section::Failed,
            gpu: Section::Failed,
            errors: ErrorSet::default(),
        };

        let text = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            text,
            r#"{"Memory":null,"CPU":null,"Block":null,"Topology":null,"Network":null,"GPU":null,"Errors":{}}"#
        );
    }

    #[test]
    fn error_set_keys() {
        let mut errors = ErrorSet::default();
        assert!(errors.is_empty());

        errors.set(Category::Cpu, "permission denied".to_string());

        assert!(!errors.is_empty());
        assert_eq!(errors.get(Category::Cpu), Some("permission denied"));
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"CPU": "permission denied"})
        );
    }
}
