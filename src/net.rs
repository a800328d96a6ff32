use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;

/// How many consecutive ports to probe before giving up.
const MAX_PROBES: u16 = 100;

/// Find the first bindable port at or above `candidate`.
///
/// Probes by binding a transient listener on all interfaces and
/// releasing it immediately; the caller rebinds for real. Ports that
/// are already taken are skipped. Bind failures other than
/// `AddrInUse` propagate.
pub async fn resolve_port(candidate: u16) -> anyhow::Result<u16> {
    let mut port = candidate;
    loop {
        match TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await {
            Ok(listener) => {
                drop(listener);
                return Ok(port);
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                tracing::warn!(port, "port in use, trying the next one");
                let next = port.checked_add(1).ok_or_else(|| {
                    anyhow::anyhow!("no free port at or above {}", candidate)
                })?;
                if next - candidate >= MAX_PROBES {
                    anyhow::bail!(
                        "no free port found in {}..{} ({} attempts)",
                        candidate,
                        next,
                        MAX_PROBES
                    );
                }
                port = next;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_candidate_when_free() {
        // Grab an ephemeral port, release it, then resolve it.
        let probe = TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let resolved = resolve_port(port).await.unwrap();
        assert_eq!(resolved, port);
    }

    #[tokio::test]
    async fn skips_occupied_port() {
        // Hold a listener open so the candidate is taken.
        let held = TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = held.local_addr().unwrap().port();

        let resolved = resolve_port(port).await.unwrap();
        assert!(resolved > port);
        assert!(resolved - port < MAX_PROBES);
        drop(held);
    }
}
