//! bank-csv-to-ledger - Convert a bank CSV export into ledger entries.

fn main() -> std::process::ExitCode {
    bankledger::cmd::convert::main()
}
