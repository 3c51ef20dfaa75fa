//! Gen-Z command connection.

use super::types::CommandMessage;
use super::{GENZ_GENL_NAME, GenzCmd};
use crate::netlink::error::{Error, Result};
use crate::netlink::genl::{FamilyInfo, GenlConnection};

/// The resolved `genz_cmd` family.
///
/// Valid until the Gen-Z module is reloaded; after that the kernel may hand
/// out a different ID and [`GenzConnection::rebind`] must be called.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FamilyBinding {
    /// Family name.
    pub name: String,
    /// Kernel-assigned family ID, written to `nlmsg_type`.
    pub id: u16,
    /// Version the kernel module registered.
    pub version: u8,
    pub hdr_size: u32,
    pub max_attr: u32,
}

impl From<FamilyInfo> for FamilyBinding {
    fn from(info: FamilyInfo) -> Self {
        Self {
            name: info.name,
            id: info.id,
            version: info.version,
            hdr_size: info.hdr_size,
            max_attr: info.max_attr,
        }
    }
}

/// Connection to the Gen-Z subsystem's command family.
///
/// Resolves `genz_cmd` once at open and reuses the binding for every
/// command. Each send waits for the kernel's acknowledgement, so a rejected
/// command surfaces as [`Error::Kernel`](crate::Error::Kernel) with the
/// kernel's errno.
///
/// # Example
///
/// ```rust,no_run
/// use genz_netlink::netlink::genl::genz::GenzConnection;
///
/// # async fn example() -> genz_netlink::Result<()> {
/// let conn = GenzConnection::open().await?;
/// conn.add_component(4242, 43, [0u8; 16]).await?;
/// # Ok(())
/// # }
/// ```
pub struct GenzConnection {
    genl: GenlConnection,
    binding: FamilyBinding,
}

impl GenzConnection {
    /// Open a Generic Netlink socket and resolve the `genz_cmd` family.
    ///
    /// Fails with [`Error::FamilyNotFound`](crate::Error::FamilyNotFound)
    /// if the Gen-Z module is not loaded.
    pub async fn open() -> Result<Self> {
        Self::from_genl(GenlConnection::new()?).await
    }

    /// Resolve the family over an existing connection.
    pub async fn from_genl(genl: GenlConnection) -> Result<Self> {
        let binding: FamilyBinding = genl.get_family(GENZ_GENL_NAME).await?.into();
        tracing::debug!(
            id = binding.id,
            version = binding.version,
            max_attr = binding.max_attr,
            "bound genz_cmd family"
        );
        Ok(Self { genl, binding })
    }

    pub fn binding(&self) -> &FamilyBinding {
        &self.binding
    }

    /// The resolved family ID.
    pub fn family_id(&self) -> u16 {
        self.binding.id
    }

    /// Port ID the kernel assigned to this socket.
    pub fn port_id(&self) -> u32 {
        self.genl.socket().pid()
    }

    /// Build a command message for the current process.
    ///
    /// Validation happens here, before anything reaches the socket.
    pub fn build_command<C>(
        &self,
        cmd: C,
        gcid: u32,
        cclass: u16,
        uuid: impl AsRef<[u8]>,
    ) -> Result<CommandMessage>
    where
        C: TryInto<GenzCmd>,
        Error: From<C::Error>,
    {
        CommandMessage::new(cmd, gcid, cclass, uuid)
    }

    /// Send a command and wait for the kernel's ACK.
    ///
    /// Returns any reply payloads the kernel sent before the ACK; the
    /// current Gen-Z module sends none.
    pub async fn send(&self, msg: &CommandMessage) -> Result<Vec<Vec<u8>>> {
        tracing::debug!(
            cmd = %msg.cmd(),
            gcid = msg.gcid(),
            cclass = msg.cclass(),
            uuid = %msg.uuid_string(),
            "sending genz command"
        );
        self.genl.request(msg.to_builder(self.binding.id)).await
    }

    /// Re-resolve the family after a module reload.
    pub async fn rebind(&mut self) -> Result<&FamilyBinding> {
        self.genl.clear_cache();
        let binding: FamilyBinding = self.genl.get_family(GENZ_GENL_NAME).await?.into();
        if binding.id != self.binding.id {
            tracing::info!(old = self.binding.id, new = binding.id, "genz_cmd family ID changed");
        }
        self.binding = binding;
        Ok(&self.binding)
    }

    pub async fn add_component(&self, gcid: u32, cclass: u16, uuid: impl AsRef<[u8]>) -> Result<()> {
        self.run(GenzCmd::AddComponent, gcid, cclass, uuid).await
    }

    pub async fn remove_component(
        &self,
        gcid: u32,
        cclass: u16,
        uuid: impl AsRef<[u8]>,
    ) -> Result<()> {
        self.run(GenzCmd::RemoveComponent, gcid, cclass, uuid).await
    }

    pub async fn symlink_component(
        &self,
        gcid: u32,
        cclass: u16,
        uuid: impl AsRef<[u8]>,
    ) -> Result<()> {
        self.run(GenzCmd::SymlinkComponent, gcid, cclass, uuid).await
    }

    async fn run(&self, cmd: GenzCmd, gcid: u32, cclass: u16, uuid: impl AsRef<[u8]>) -> Result<()> {
        let msg = CommandMessage::new(cmd, gcid, cclass, uuid)?;
        self.send(&msg).await?;
        Ok(())
    }
}
