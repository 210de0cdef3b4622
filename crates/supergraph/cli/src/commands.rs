//! Command implementations

use anyhow::Context;
use supergraph_engine::Manager;
use supergraph_types::{ContainerId, ContainerKind, Content};
use tracing::info;

pub async fn install_schema(manager: &Manager) -> anyhow::Result<()> {
    manager.store().install_schema().await?;
    println!("schema installed ({})", manager.config().storage.label());
    Ok(())
}

pub async fn create_default_root(manager: &Manager) -> anyhow::Result<()> {
    let root = manager.containers().ensure_default_root().await?;
    println!("{}\t{}", root.id(), root.name());
    Ok(())
}

pub async fn list(manager: &Manager, kind: Option<ContainerKind>) -> anyhow::Result<()> {
    let containers = manager.containers().list(kind).await?;
    if containers.is_empty() {
        println!("no containers");
        return Ok(());
    }
    for container in containers {
        let record = container.record();
        println!(
            "{}\t{:<8}\t{}\t{}",
            record.id,
            record.kind.as_str(),
            record.updated_at.format("%Y-%m-%d %H:%M"),
            record.name
        );
    }
    Ok(())
}

pub async fn export(manager: &Manager, container_id: &str) -> anyhow::Result<()> {
    let id: ContainerId = container_id.parse()?;
    let container = manager.containers().get(id).await?;
    let content = manager.read(&container).await?.sorted();
    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}

pub async fn import(manager: &Manager, container_id: &str, file: &str) -> anyhow::Result<()> {
    let id: ContainerId = container_id.parse()?;
    let raw = std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    let content: Content =
        serde_json::from_str(&raw).with_context(|| format!("{file} is not valid content"))?;

    let container = manager.containers().get(id).await?;
    let summary = content.info();
    manager.replace(&container, content).await?;
    info!(container = %id, content = %summary, "content imported");
    println!("imported {summary} into {id}");
    Ok(())
}

pub async fn stats(manager: &Manager) -> anyhow::Result<()> {
    let stats = manager.stats().await?;
    println!("{stats}");
    Ok(())
}
