//! Command channel tests against a loaded Gen-Z module.

use genz_netlink::netlink::genl::GenlConnection;
use genz_netlink::netlink::genl::genz::GENZ_GENL_NAME;
use genz_netlink::{GenzCmd, Result};

#[tokio::test]
async fn test_resolve_control_family() -> Result<()> {
    let genl = GenlConnection::new()?;
    let info = genl.get_family("nlctrl").await?;
    assert_eq!(info.id, 0x10);

    Ok(())
}

#[tokio::test]
async fn test_missing_family_is_bind_error() -> Result<()> {
    let genl = GenlConnection::new()?;
    let err = genl.get_family("genz_no_such_family").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.kind(), genz_netlink::ErrorKind::Bind);

    Ok(())
}

#[tokio::test]
async fn test_resolve_genz_family() -> Result<()> {
    let mut conn = require_genz!();

    assert_eq!(conn.binding().name, GENZ_GENL_NAME);
    assert_ne!(conn.family_id(), 0);

    let before = conn.family_id();
    let after = conn.rebind().await?.id;
    assert_eq!(before, after);

    Ok(())
}

#[tokio::test]
async fn test_add_component() -> Result<()> {
    require_root!();
    let conn = require_genz!();

    let msg = conn.build_command(GenzCmd::AddComponent, 4242, 43, [0x5au8; 16])?;
    conn.send(&msg).await?;

    Ok(())
}

#[tokio::test]
async fn test_invalid_uuid_never_sent() -> Result<()> {
    let conn = require_genz!();

    let err = conn
        .build_command(GenzCmd::AddComponent, 4242, 43, [0u8; 15])
        .unwrap_err();
    assert!(err.is_validation());

    Ok(())
}
