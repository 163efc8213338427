use serde::{Deserialize, Serialize};

/// 返回给调用方的 JSON 结构
///
/// 要么是 `{"comparison": ...}`，要么是 `{"error": ...}`，不会同时出现。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Comparison { comparison: String },
    Error { error: String },
}

/// 比较成功的结果
///
/// 构造时即完成序列化，拿到的一定是完整、可发送的 JSON。
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    comparison: String,
    json: String,
}

impl ComparisonResult {
    pub fn new(comparison: String) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(&ResponseBody::Comparison {
            comparison: comparison.clone(),
        })?;
        Ok(Self { comparison, json })
    }

    pub fn comparison(&self) -> &str {
        &self.comparison
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn into_json(self) -> String {
        self.json
    }
}
