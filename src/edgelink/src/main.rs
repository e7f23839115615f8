use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use edgelink_client::{AdcClient, ClientOptions};
use edgelink_config::load_config;
use edgelink_core::Protocol;

#[derive(Parser, Debug)]
#[command(version, about = "EdgeLink: virtual-service management for EdgeADC devices")]
struct Args {
    /// Path to config file (yaml/json/toml)
    #[arg(short, long, default_value = "./edgelink.yaml")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List virtual services and their members
    List,
    /// Show one virtual service in detail
    Show { ip: String, port: u16 },
    /// Show device system information
    Info,
    /// Stage a new virtual service (run `apply` to commit)
    CreateVip {
        ip: String,
        port: u16,
        #[arg(default_value = "HTTP")]
        protocol: Protocol,
        /// Service name; defaults to vip-<ip>-<port>
        #[arg(long)]
        name: Option<String>,
    },
    /// Stage deletion of a virtual service (run `apply` to commit)
    DeleteVip { ip: String, port: u16 },
    /// Add a backend member to a virtual service (commits immediately)
    AddMember {
        vip_ip: String,
        vip_port: u16,
        ip: String,
        port: u16,
        #[arg(long, default_value_t = 100)]
        weight: u32,
    },
    /// Change a member's weight (commits immediately)
    SetWeight {
        vip_ip: String,
        vip_port: u16,
        ip: String,
        port: u16,
        weight: u32,
    },
    /// Remove a member from a virtual service (commits immediately)
    DelMember {
        vip_ip: String,
        vip_port: u16,
        ip: String,
        port: u16,
    },
    /// Commit all staged changes on the device
    Apply,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config)?;
    edgelink_tracing::init(&config.tracing.logging_mode)?;

    let device = &config.device;
    let client = AdcClient::new(
        &device.host,
        device.port,
        &device.username,
        &device.password,
        ClientOptions {
            timeout: Duration::from_secs(device.timeout_secs),
            verify_ssl: device.verify_ssl,
        },
    )?;

    match args.command {
        Command::List => {
            for vs in client.list_virtual_services().await? {
                if vs.is_placeholder() {
                    println!("[blank template] sId={}", vs.s_id);
                    continue;
                }
                println!(
                    "{}:{} {} ({})",
                    vs.ip_addr,
                    vs.port,
                    vs.protocol(),
                    vs.service_name
                );
                for m in vs.members() {
                    println!(
                        "  - {}:{} weight={} status={}",
                        m.address, m.port, m.weight, m.status
                    );
                }
            }
        }
        Command::Show { ip, port } => {
            let Some(vs) = client.find_virtual_service(&ip, port).await? else {
                bail!("virtual service {ip}:{port} not found");
            };
            println!(
                "{}:{} {} ({}) interface={} channel={} mask={}",
                vs.ip_addr,
                vs.port,
                vs.protocol(),
                vs.service_name,
                vs.interface_id,
                vs.channel_id,
                vs.subnet_mask
            );
            for m in vs.members() {
                println!(
                    "  - {}:{} weight={} cId={} status={}",
                    m.address, m.port, m.weight, m.c_id, m.status
                );
            }
        }
        Command::Info => {
            let info = client.get_system_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::CreateVip {
            ip,
            port,
            protocol,
            name,
        } => {
            let name = name.unwrap_or_else(|| format!("vip-{ip}-{port}"));
            client
                .create_virtual_service(&ip, port, protocol, &device.subnet_mask, &name)
                .await?;
            println!("staged virtual service {ip}:{port}; run `edgelink apply` to commit");
        }
        Command::DeleteVip { ip, port } => {
            if client.delete_virtual_service(&ip, port).await? {
                println!("staged delete of {ip}:{port}; run `edgelink apply` to commit");
            } else {
                bail!("virtual service {ip}:{port} not found");
            }
        }
        Command::AddMember {
            vip_ip,
            vip_port,
            ip,
            port,
            weight,
        } => {
            if client
                .add_member(&vip_ip, vip_port, &ip, port, weight)
                .await?
            {
                println!("added member {ip}:{port} to {vip_ip}:{vip_port}");
            } else {
                bail!("virtual service {vip_ip}:{vip_port} not found");
            }
        }
        Command::SetWeight {
            vip_ip,
            vip_port,
            ip,
            port,
            weight,
        } => {
            if client
                .update_member_weight(&vip_ip, vip_port, &ip, port, weight)
                .await?
            {
                println!("set weight {weight} on {ip}:{port}");
            } else {
                bail!("member {ip}:{port} not found on {vip_ip}:{vip_port}");
            }
        }
        Command::DelMember {
            vip_ip,
            vip_port,
            ip,
            port,
        } => {
            if client.delete_member(&vip_ip, vip_port, &ip, port).await? {
                println!("deleted member {ip}:{port} from {vip_ip}:{vip_port}");
            } else {
                bail!("member {ip}:{port} not found on {vip_ip}:{vip_port}");
            }
        }
        Command::Apply => {
            client.apply_config().await?;
            println!("applied pending configuration on {}", client.host());
        }
    }

    Ok(())
}
