use serde::{Deserialize, Serialize};

/// The state machine a watch occupies. `Unknown` holds only before the
/// first check has ever run for a watch (`status = Unknown iff time is
/// null`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Failed,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Failed => "FAILED",
            Status::Unknown => "UNKNOWN",
        }
    }

    pub fn from_script_ok(ok: bool) -> Self {
        if ok {
            Status::Ok
        } else {
            Status::Failed
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Status::Ok),
            "FAILED" => Ok(Status::Failed),
            "UNKNOWN" => Ok(Status::Unknown),
            other => Err(format!("invalid status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for s in [Status::Ok, Status::Failed, Status::Unknown] {
            let parsed: Status = s.as_str().parse().unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn from_script_ok_maps_booleans() {
        assert_eq!(Status::from_script_ok(true), Status::Ok);
        assert_eq!(Status::from_script_ok(false), Status::Failed);
    }
}
