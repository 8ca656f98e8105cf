/// One process at one scan instant. Memory values are in kB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    pub owner: String,
    pub command: String,
    pub rss: u64,
    pub pss: u64,
    pub uss: u64,
    pub swap: u64,
}
