mod window_query_adapter;

pub use window_query_adapter::{QueryError, RawRect, RawWindowFacts, WindowQueryAdapter};
