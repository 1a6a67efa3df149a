//! OpenVPN config documents: sentinel scan and managed-block splice.
//!
//! The document is treated as opaque text except for two sentinel comment
//! lines delimiting the block this tool owns. Every byte outside that span
//! survives a merge unchanged, including line terminators.

use ipnet::IpNet;

use crate::error::VpnRoutesError;
use crate::routeset::RouteSet;

/// First line of the managed block.
pub const BLOCK_BEGIN: &str = "# BEGIN vpnroutes managed block";
/// Last line of the managed block.
pub const BLOCK_END: &str = "# END vpnroutes managed block";

/// An OpenVPN client config held as raw lines.
///
/// Lines keep their original terminators so foreign content round-trips
/// byte-identically; generated lines use the document's dominant newline
/// style.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    lines: Vec<String>,
    newline: &'static str,
}

impl ConfigDocument {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let newline = match lines.first() {
            Some(first) if first.ends_with("\r\n") => "\r\n",
            _ => "\n",
        };
        Self { lines, newline }
    }

    /// Locate the managed block.
    ///
    /// Returns `Ok(None)` when the document has no block yet, or the line
    /// indices of the sentinel pair. Duplicated or unpaired sentinels make
    /// the document ambiguous and fail before anything is rewritten.
    pub fn managed_span(&self) -> Result<Option<(usize, usize)>, VpnRoutesError> {
        let marker_lines = |marker: &str| -> Vec<usize> {
            self.lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.trim() == marker)
                .map(|(idx, _)| idx)
                .collect()
        };
        let begins = marker_lines(BLOCK_BEGIN);
        let ends = marker_lines(BLOCK_END);

        match (begins.as_slice(), ends.as_slice()) {
            ([], []) => Ok(None),
            ([begin], [end]) if begin < end => Ok(Some((*begin, *end))),
            ([begin], [end]) => Err(VpnRoutesError::ConfigFormat(format!(
                "end marker at line {} precedes begin marker at line {}",
                end + 1,
                begin + 1
            ))),
            ([begin], []) => Err(VpnRoutesError::ConfigFormat(format!(
                "begin marker at line {} has no matching end marker",
                begin + 1
            ))),
            ([], [end]) => Err(VpnRoutesError::ConfigFormat(format!(
                "end marker at line {} has no matching begin marker",
                end + 1
            ))),
            (begins, ends) => Err(VpnRoutesError::ConfigFormat(format!(
                "found {} begin and {} end markers, expected exactly one of each",
                begins.len(),
                ends.len()
            ))),
        }
    }

    /// Replace the managed block with directives for `routes`, or insert a
    /// fresh block when the document has none.
    ///
    /// When replacing, the original sentinel lines are kept byte-exact. A
    /// fresh block goes one line past the last route-related directive, or
    /// at end of file; an unterminated final line gains a terminator first.
    pub fn merge_routes(&mut self, routes: &RouteSet) -> Result<(), VpnRoutesError> {
        let directives: Vec<String> = routes
            .iter()
            .map(|net| format!("{}{}", directive(net), self.newline))
            .collect();

        match self.managed_span()? {
            Some((begin, end)) => {
                self.lines.splice(begin + 1..end, directives);
            }
            None => {
                let at = self.insertion_point();
                if at == self.lines.len() {
                    if let Some(last) = self.lines.last_mut() {
                        if !last.ends_with('\n') {
                            last.push_str(self.newline);
                        }
                    }
                }
                let mut block = Vec::with_capacity(directives.len() + 2);
                block.push(format!("{}{}", BLOCK_BEGIN, self.newline));
                block.extend(directives);
                block.push(format!("{}{}", BLOCK_END, self.newline));
                self.lines.splice(at..at, block);
            }
        }

        Ok(())
    }

    /// One line past the last `route`, `route-ipv6`, or `push` directive;
    /// end of file when the document has none.
    fn insertion_point(&self) -> usize {
        let mut at = self.lines.len();
        for (idx, line) in self.lines.iter().enumerate() {
            if let Some(keyword) = line.split_whitespace().next() {
                if matches!(keyword, "route" | "route-ipv6" | "push") {
                    at = idx + 1;
                }
            }
        }
        at
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }
}

/// Render one route directive in OpenVPN syntax.
///
/// IPv4 uses network/netmask form, IPv6 uses CIDR form; both send matching
/// traffic to the tunnel gateway.
pub fn directive(net: &IpNet) -> String {
    match net {
        IpNet::V4(v4) => format!("route {} {} vpn_gateway default", v4.network(), v4.netmask()),
        IpNet::V6(v6) => format!(
            "route-ipv6 {}/{} default default",
            v6.network(),
            v6.prefix_len()
        ),
    }
}
