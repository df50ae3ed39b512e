use std::collections::HashMap;

pub trait FetchConfig: Send + Sync {
    fn endpoint(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn headers(&self) -> Option<&HashMap<String, String>> {
        None
    }
}
