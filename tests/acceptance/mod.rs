mod config_state;
mod timing_apply;
