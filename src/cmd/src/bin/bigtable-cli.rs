// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use cmd::error::Result;
use cmd::Command;
use common_error::ext::ErrorExt;

async fn run(cmd: Command) -> Result<()> {
    let instance = cmd.build()?;
    instance.start().await
}

#[allow(clippy::print_stderr)]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cmd = Command::parse();

    let code = match run(cmd).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e.output_msg());
            1
        }
    };

    std::process::exit(code);
}
