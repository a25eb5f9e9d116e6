//! Success-or-failure results handed to the outer (HTTP) layer

use serde::{Deserialize, Serialize};

/// Outcome of an operation without a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInfo {
    pub success: bool,
    pub messages: Vec<String>,
}

impl ResultInfo {
    pub fn new<I, S>(success: bool, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            success,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(true, [message])
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(false, [message])
    }

    /// Merge another result in: fails if either fails, messages appended
    pub fn concat(&mut self, other: ResultInfo) {
        self.success = self.success && other.success;
        self.messages.extend(other.messages);
    }
}

/// Outcome carrying a payload on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub messages: Vec<String>,
}

impl<T> DataResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            messages: Vec::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            messages: vec![message.into()],
        }
    }

    /// Carry over status and messages of `info` alongside `data`
    pub fn from_info(info: ResultInfo, data: Option<T>) -> Self {
        Self {
            success: info.success,
            data,
            messages: info.messages,
        }
    }
}

/// One page of a lazily loaded listing.
///
/// `total` counts every record that passed the filters; `data` holds the
/// requested window only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub success: bool,
    pub total: usize,
    pub data: Vec<T>,
    pub messages: Vec<String>,
}

impl<T> QueryResult<T> {
    pub fn success(total: usize, data: Vec<T>) -> Self {
        Self {
            success: true,
            total,
            data,
            messages: Vec::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            total: 0,
            data: Vec::new(),
            messages: vec![message.into()],
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> QueryResult<U> {
        QueryResult {
            success: self.success,
            total: self.total,
            data: self.data.into_iter().map(f).collect(),
            messages: self.messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_keeps_failure_and_messages() {
        let mut result = ResultInfo::ok("first");
        result.concat(ResultInfo::fail("second"));
        assert!(!result.success);
        assert_eq!(result.messages, vec!["first", "second"]);
    }

    #[test]
    fn failed_query_result_is_empty() {
        let result: QueryResult<u8> = QueryResult::fail("nope");
        assert!(!result.success);
        assert_eq!(result.total, 0);
        assert!(result.data.is_empty());
        assert_eq!(result.messages, vec!["nope"]);
    }

    #[test]
    fn query_result_serializes_camel_case() {
        let encoded = serde_json::to_value(QueryResult::success(3, vec![1, 2])).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({"success": true, "total": 3, "data": [1, 2], "messages": []})
        );
    }

    #[test]
    fn data_result_from_info() {
        let result = DataResult::from_info(ResultInfo::new(true, ["done"]), Some(5));
        assert_eq!(result.data, Some(5));
        assert_eq!(result.messages, vec!["done"]);
    }
}
