mod test_ready_drives_offer_answer;
