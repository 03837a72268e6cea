mod test_relay_loss_ends_sessions;
mod test_stop_notifies_recording_once;
