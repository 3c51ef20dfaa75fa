//! genz family - resolve a generic netlink family, as `genl ctrl get` does.

use clap::Args;
use genz_netlink::Result;
use genz_netlink::netlink::genl::GenlConnection;
use genz_netlink::netlink::genl::genz::GENZ_GENL_NAME;

#[derive(Args)]
pub struct FamilyCmd {
    /// Family name.
    #[arg(default_value = GENZ_GENL_NAME)]
    name: String,
}

impl FamilyCmd {
    pub async fn run(&self, json: bool) -> Result<()> {
        let conn = GenlConnection::new()?;
        let info = conn.get_family(&self.name).await?;

        if json {
            println!("{}", serde_json::json!(info));
            return Ok(());
        }

        println!(
            "{}: id {:#x} version {} hdrsize {} maxattr {}",
            info.name, info.id, info.version, info.hdr_size, info.max_attr
        );

        let mut groups: Vec<_> = info.mcast_groups.iter().collect();
        groups.sort();
        for (name, id) in groups {
            println!("    mcast group {} id {:#x}", name, id);
        }

        Ok(())
    }
}
