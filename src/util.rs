use std::net::{IpAddr, Ipv4Addr};

const HUB_PORT: &str = "DURGA_PORT";

const DEFAULT_PORT: u16 = 5000;

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

pub fn get_port() -> u16 {
    let port_from_env = std::env::var(HUB_PORT);
    port_from_env.map_or(DEFAULT_PORT, |res| res.parse().unwrap_or(DEFAULT_PORT))
}

const HUB_ADDR: &str = "DURGA_ADDR";

const DEFAULT_ADDR: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 0);

pub fn get_default_addr() -> IpAddr {
    IpAddr::V4(DEFAULT_ADDR)
}

pub fn get_addr() -> IpAddr {
    let addr_from_env = std::env::var(HUB_ADDR);
    addr_from_env.map_or(get_default_addr(), |res| {
        res.parse().unwrap_or(get_default_addr())
    })
}
