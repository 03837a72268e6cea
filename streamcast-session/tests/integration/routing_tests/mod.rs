mod test_remote_tracks_land_in_the_right_sinks;
