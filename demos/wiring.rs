use std::{sync::Arc, time::SystemTime};

use wiregraph::*;

// Define regular traits and implementor structs

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}

trait DateLogger: Send + Sync {
    fn log_date(&self) -> Result<(), BoxError>;
}

#[derive(Default)]
struct LoggerImpl;

impl Logger for LoggerImpl {
    fn log(&self, content: &str) {
        println!("{}", content);
    }
}

struct DateLoggerImpl {
    logger: Arc<dyn Logger>,
}

impl DateLoggerImpl {
    fn new(logger: Arc<dyn Logger>) -> Arc<dyn DateLogger> {
        Arc::new(Self { logger })
    }
}

impl DateLogger for DateLoggerImpl {
    fn log_date(&self) -> Result<(), BoxError> {
        let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
        self.logger.log(&format!("{}s since epoch", now.as_secs()));
        Ok(())
    }
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Register the logger instance and a constructor depending on it
    let graph = Graph::new();
    let logger: Arc<dyn Logger> = Arc::new(LoggerImpl);
    graph.register_all([instance(logger), constructor(DateLoggerImpl::new)])?;

    let b: Arc<dyn DateLogger> = graph.inject()?;
    b.log_date()?;

    print!("{}", graph.debug_dump());
    Ok(())
}
