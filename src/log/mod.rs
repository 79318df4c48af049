//// Diagnostics infrastructure. Everything the solver has to say goes to a
//// `LogSink`, which forwards it to every registered `LogStream`.

pub(crate) mod markdown;
pub(crate) mod output;
