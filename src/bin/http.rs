#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use project_planner::{PlannerConfig, Project, http_api};

    env_logger::init();

    let addr: SocketAddr = std::env::var(http_api::HTTP_ADDR_ENV)
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let config = PlannerConfig::from_env()?;

    println!("project-planner HTTP API listening on http://{addr}");
    let project = Project::new().with_config(config);
    http_api::serve(addr, project).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
