use libc;

pub const ETH_P_ALL: u16 = 0x0003;

pub const ARPHRD_ETHER: u16 = 1;

pub const PACKET_OUTGOING: u8 = 4;

pub const SIOCGIFHWADDR: libc::c_ulong = 0x8927;

#[repr(C)]
#[derive(Clone, Copy)]
/// [https://linux.die.net/man/7/netdevice](https://linux.die.net/man/7/netdevice)
pub struct c_ifreq {
    pub ifr_name: [libc::c_char; libc::IF_NAMESIZE],
    pub ifr_hwaddr: libc::sockaddr,
    _pad: [u8; 8],
}

impl c_ifreq {
    /// Creates a request for an interface, or None if the name does not fit
    /// with its NUL terminator.
    pub fn with_name(ifr_name: &str) -> Option<c_ifreq> {
        if ifr_name.len() >= libc::IF_NAMESIZE {
            return None;
        }

        let mut ifreq = c_ifreq {
            ifr_name: [0; libc::IF_NAMESIZE],
            ifr_hwaddr: libc::sockaddr {
                sa_family: 0,
                sa_data: [0; 14],
            },
            _pad: [0; 8],
        };

        for (i, c) in ifr_name.as_bytes().iter().enumerate() {
            ifreq.ifr_name[i] = *c as libc::c_char;
        }

        Some(ifreq)
    }
}

pub fn errno() -> libc::c_int {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
