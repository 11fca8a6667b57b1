use {
    clap::Parser,
    crucible::{solver::Solution, Args, RunQuestions},
};

fn main() {
    let args: Args = Args::parse();

    Solution::run(&args);
}
