mod evaluate;
mod load;
mod search;
mod server;

pub use evaluate::*;
pub use load::*;
pub use search::*;
pub use server::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
